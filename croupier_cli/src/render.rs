//! Everything the player sees. Nothing here touches game state.

use std::io::{self, Write};

use croupier_core::{BetKind, Paytable, Pocket, RoundOutcome, Stats, TableConfig};
use croupier_shared::{CasinoError, Color, HistoryEntry, UserRecord};
use crossterm::style::{StyledContent, Stylize};

fn paint_pocket(pocket: Pocket) -> StyledContent<String> {
    let text = format!("{:>2}", pocket.to_index());
    match pocket.color() {
        Color::Green => text.green(),
        Color::Red => text.red(),
        Color::Black => text.blue(),
    }
}

fn paint_color(color: Color) -> StyledContent<String> {
    let text = color.to_string();
    match color {
        Color::Green => text.green(),
        Color::Red => text.red(),
        Color::Black => text.blue(),
    }
}

pub fn banner(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", "|=======================|".bold().magenta())?;
    writeln!(out, "{}", "|   CROUPIER ROULETTE   |".bold().magenta())?;
    writeln!(out, "{}", "|=======================|".bold().magenta())?;
    writeln!(out, "1) Login\n2) Register\n3) Exit")
}

pub fn fairness_commitment(out: &mut impl Write, seed_hash: &str) -> io::Result<()> {
    writeln!(out, "Server seed hash for this table: {}", seed_hash.dim())
}

pub fn fairness_reveal(out: &mut impl Write, server_seed: &str, client_seed: &str, spins: u64) -> io::Result<()> {
    writeln!(
        out,
        "Server seed was {} (client seed {}, nonces 1-{}). Check any spin with `croupier verify`.",
        server_seed.dim(),
        client_seed,
        spins
    )
}

pub fn rules(out: &mut impl Write, table: &TableConfig, paytable: &Paytable) -> io::Result<()> {
    writeln!(out, "\n{}", "ROULETTE RULES".bold().yellow())?;
    writeln!(out, "1. Bet types:")?;
    for kind in BetKind::ALL {
        let pays = format!("{}:1", paytable.multiplier(kind));
        writeln!(out, "   - {} ({})", kind.name(), pays.yellow())?;
    }
    writeln!(out, "2. Min bet: ${}, Max bet: ${}\n", table.min_bet, table.max_bet)
}

pub fn wheel(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\n{}", "ROULETTE WHEEL".bold().cyan())?;
    write!(out, "  {}\n  ", paint_pocket(Pocket::ZERO))?;
    for pocket in Pocket::all().skip(1) {
        write!(out, "{} ", paint_pocket(pocket))?;
        if pocket.to_index() % 12 == 0 {
            write!(out, "\n  ")?;
        }
    }
    writeln!(out)
}

pub fn main_menu(out: &mut impl Write, is_admin: bool) -> io::Result<()> {
    writeln!(out, "\n{}", "MAIN MENU".bold().blue())?;
    writeln!(
        out,
        "{}",
        "1) Play Roulette\n2) View Balance\n3) View Statistics\n4) View Game History\n5) Change Password".yellow()
    )?;
    if is_admin {
        writeln!(out, "{}", "6) Admin Menu".magenta())?;
    }
    writeln!(out, "{}", "0) Exit".red())
}

pub fn admin_menu(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\n{}", "ADMIN PANEL".bold().blue())?;
    writeln!(out, "1) Reset user balance\n2) View all users\n3) Promote to admin")?;
    writeln!(out, "{}", "4) Return to Main Menu".red())
}

pub fn bet_menu(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\n{}", "BET TYPES".bold().cyan())?;
    for kind in BetKind::ALL {
        writeln!(out, "{}) {}", kind.to_index(), kind.name())?;
    }
    Ok(())
}

pub fn selection_question(kind: BetKind) -> &'static str {
    match kind {
        BetKind::Number => "Enter number (0-36): ",
        BetKind::EvenOdd => "1) Even 2) Odd: ",
        BetKind::RedBlack => "1) Red 2) Black: ",
        BetKind::HighLow => "1) Low (1-18) 2) High (19-36): ",
        BetKind::Dozen => "1) 1-12 2) 13-24 3) 25-36: ",
        BetKind::Column => "Column (1-3): ",
    }
}

pub fn outcome(out: &mut impl Write, round: &RoundOutcome) -> io::Result<()> {
    writeln!(
        out,
        "\nThe ball lands on {} {}!",
        paint_pocket(round.spin.pocket).bold(),
        paint_color(round.spin.color)
    )?;
    let r = &round.resolution;
    if r.is_win() {
        let msg = format!("You won ${} on {}!", r.payout(), r.label);
        writeln!(out, "{}", msg.bold().green())?;
    } else {
        let msg = format!("You lost ${} on {}.", r.amount, r.label);
        writeln!(out, "{}", msg.red())?;
    }
    writeln!(out, "New balance: ${}", round.balance.to_string().green())
}

pub fn balance(out: &mut impl Write, amount: i64) -> io::Result<()> {
    writeln!(out, "\nYour Current Balance: ${}", amount.to_string().green())
}

pub fn stats(out: &mut impl Write, stats: &Stats) -> io::Result<()> {
    writeln!(out, "\n{}", "PLAYER STATISTICS".bold().magenta())?;
    writeln!(out, "Username: {}", stats.username)?;
    writeln!(out, "Current Balance: ${}", stats.balance.to_string().green())?;
    writeln!(out, "Games Played: {}", stats.games_played)?;
    writeln!(out, "Games Won: {}", stats.games_won)?;
    writeln!(out, "Win Percentage: {}", format!("{:.1}%", stats.win_rate).yellow())?;
    writeln!(out, "Highest Single Win: ${}", stats.highest_win.to_string().magenta())
}

pub fn history(out: &mut impl Write, username: &str, entries: &[&HistoryEntry]) -> io::Result<()> {
    if entries.is_empty() {
        let msg = format!("No game history found for {username}.");
        return writeln!(out, "{}", msg.yellow());
    }
    writeln!(out, "\n{}", "GAME HISTORY".bold().cyan())?;
    for e in entries {
        writeln!(
            out,
            "[{}] {} | Bet: ${} | Result: {} | Payout: ${}",
            e.ts.format("%Y-%m-%d %H:%M:%S"),
            e.label,
            e.bet_amount,
            e.result,
            e.payout
        )?;
    }
    Ok(())
}

pub fn users_table(out: &mut impl Write, users: &[UserRecord]) -> io::Result<()> {
    writeln!(out, "{}", "|==================|==========|=======|=======|".bold().yellow())?;
    writeln!(out, "| {:<16} | {:<8} | {:<5} | Admin |", "Username", "Balance", "Games")?;
    writeln!(out, "{}", "|==================|==========|=======|=======|".bold().yellow())?;
    for u in users {
        let admin = if u.is_admin { "Yes".green() } else { "No ".red() };
        writeln!(
            out,
            "| {:<16} | {:<8} | {:<5} | {}   |",
            u.username, u.balance, u.games_played, admin
        )?;
    }
    Ok(())
}

pub fn notice(out: &mut impl Write, msg: &str) -> io::Result<()> {
    writeln!(out, "{}", msg.green())
}

pub fn warning(out: &mut impl Write, msg: &str) -> io::Result<()> {
    writeln!(out, "{}", msg.yellow())
}

pub fn error(out: &mut impl Write, err: &CasinoError) -> io::Result<()> {
    let msg = match err {
        CasinoError::NotFound(name) => format!("User {name} not found."),
        CasinoError::WrongPassword => "Incorrect password.".to_string(),
        other => format!("Error: {other}"),
    };
    writeln!(out, "{}", msg.bold().red())
}

pub fn goodbye(out: &mut impl Write, username: &str, balance: i64) -> io::Result<()> {
    let msg = format!("Goodbye, {username}! Final balance: ${balance}");
    writeln!(out, "\n{}", msg.bold().green())
}
