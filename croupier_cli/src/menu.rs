use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use croupier_core::{
    password::validate_password, Bet, BetKind, Casino, InactivityTimer, Paytable, Session, SpinSource, UserStore,
};
use croupier_shared::CasinoError;
use tracing::{info, warn};

use crate::prompt::{Prompter, Reply};
use crate::render;

/// How the program ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Graceful,
    Failure,
}

/// How the top level ended, and who was playing if anyone logged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finish {
    pub exit: Exit,
    pub player: Option<String>,
}

impl Finish {
    fn early(exit: Exit) -> Self {
        Self { exit, player: None }
    }
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        match exit {
            Exit::Graceful => ExitCode::SUCCESS,
            Exit::Failure => ExitCode::from(1),
        }
    }
}

/// Top level: log in or register, then hand over to the session menu.
pub fn run<R, W, S, Wh>(prompt: &mut Prompter<R, W>, casino: &mut Casino<S, Wh>) -> io::Result<Finish>
where
    R: BufRead,
    W: Write,
    S: UserStore,
    Wh: SpinSource,
{
    render::banner(prompt.out())?;
    let choice = match prompt.ask_number::<u8>("Enter your choice: ")? {
        Reply::Value(c) => c,
        Reply::Invalid(_) | Reply::Closed => {
            render::warning(prompt.out(), "Invalid input.")?;
            return Ok(Finish::early(Exit::Failure));
        }
    };

    let session = match choice {
        1 => login(prompt, casino)?,
        2 => register(prompt, casino)?,
        3 => {
            render::notice(prompt.out(), "Goodbye!")?;
            return Ok(Finish::early(Exit::Graceful));
        }
        _ => {
            render::warning(prompt.out(), "Invalid choice.")?;
            return Ok(Finish::early(Exit::Failure));
        }
    };
    match session {
        Some(session) => {
            let player = session.user().username.clone();
            let exit = session_loop(prompt, session)?;
            Ok(Finish {
                exit,
                player: Some(player),
            })
        }
        None => Ok(Finish::early(Exit::Failure)),
    }
}

fn login<'c, R, W, S, Wh>(
    prompt: &mut Prompter<R, W>,
    casino: &'c mut Casino<S, Wh>,
) -> io::Result<Option<Session<'c, S, Wh>>>
where
    R: BufRead,
    W: Write,
    S: UserStore,
    Wh: SpinSource,
{
    let Some(username) = prompt.ask_line("Enter username: ")? else {
        return Ok(None);
    };
    let Some(password) = prompt.ask_line("Enter password: ")? else {
        return Ok(None);
    };
    match casino.login(&username, &password) {
        Ok(session) => {
            let msg = format!("Welcome back, {}!", session.user().username);
            render::notice(prompt.out(), &msg)?;
            Ok(Some(session))
        }
        Err(e) => {
            warn!(username = %username, error = %e, "login failed");
            render::error(prompt.out(), &e)?;
            Ok(None)
        }
    }
}

fn register<'c, R, W, S, Wh>(
    prompt: &mut Prompter<R, W>,
    casino: &'c mut Casino<S, Wh>,
) -> io::Result<Option<Session<'c, S, Wh>>>
where
    R: BufRead,
    W: Write,
    S: UserStore,
    Wh: SpinSource,
{
    let Some(username) = prompt.ask_line("Enter username: ")? else {
        return Ok(None);
    };
    if let Err(e) = casino.ensure_username_available(&username) {
        render::error(prompt.out(), &e)?;
        return Ok(None);
    }
    let Some(password) = prompt.ask_line("Enter password (min 6 characters): ")? else {
        return Ok(None);
    };
    if let Err(e) = validate_password(&password, casino.config().auth.min_password_len) {
        render::error(prompt.out(), &e)?;
        return Ok(None);
    }

    let code = if casino.requires_activation_code(&username) {
        prompt.ask_line("Enter admin activation code: ")?
    } else {
        None
    };

    match casino.register(&username, &password, code.as_deref()) {
        Ok(session) => {
            if code.is_some() && !session.user().is_admin {
                render::warning(prompt.out(), "Invalid activation code. Registered as a regular user.")?;
            }
            let msg = format!(
                "Registration successful! Starting balance: ${}",
                session.user().balance
            );
            render::notice(prompt.out(), &msg)?;
            Ok(Some(session))
        }
        Err(e) => {
            render::error(prompt.out(), &e)?;
            Ok(None)
        }
    }
}

fn session_loop<R, W, S, Wh>(prompt: &mut Prompter<R, W>, mut session: Session<'_, S, Wh>) -> io::Result<Exit>
where
    R: BufRead,
    W: Write,
    S: UserStore,
    Wh: SpinSource,
{
    render::rules(prompt.out(), &session.config().table, &Paytable::standard())?;
    let mut timer = InactivityTimer::new(session.config().session.inactivity_timeout());

    loop {
        if let Err(e) = timer.check() {
            info!(username = %session.user().username, "session timed out");
            render::error(prompt.out(), &e)?;
            return Ok(Exit::Graceful);
        }
        timer.touch();

        render::main_menu(prompt.out(), session.user().is_admin)?;
        match prompt.ask_number::<u8>("Enter your choice: ")? {
            Reply::Closed | Reply::Value(0) => {
                render::goodbye(prompt.out(), &session.user().username, session.user().balance)?;
                return Ok(Exit::Graceful);
            }
            Reply::Value(1) => play_round(prompt, &mut session)?,
            Reply::Value(2) => render::balance(prompt.out(), session.user().balance)?,
            Reply::Value(3) => render::stats(prompt.out(), &session.stats())?,
            Reply::Value(4) => {
                let username = session.user().username.clone();
                render::history(prompt.out(), &username, &session.history())?
            }
            Reply::Value(5) => change_password(prompt, &mut session)?,
            Reply::Value(6) if session.user().is_admin => admin_menu(prompt, &mut session)?,
            Reply::Value(6) => render::warning(prompt.out(), "Admin access required.")?,
            Reply::Value(_) | Reply::Invalid(_) => {
                render::warning(prompt.out(), "Invalid choice! Please select a valid option from the menu.")?
            }
        }
    }
}

fn play_round<R, W, S, Wh>(prompt: &mut Prompter<R, W>, session: &mut Session<'_, S, Wh>) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    S: UserStore,
    Wh: SpinSource,
{
    if !session.can_play() {
        let msg = format!(
            "Insufficient balance! Minimum bet is ${}.",
            session.config().table.min_bet
        );
        return render::warning(prompt.out(), &msg);
    }

    render::bet_menu(prompt.out())?;
    let kind = match prompt.ask_number::<u8>("Enter your bet type choice: ")? {
        Reply::Value(i) => match BetKind::from_index(i) {
            Some(kind) => kind,
            None => return render::warning(prompt.out(), "Invalid bet type."),
        },
        Reply::Invalid(_) => return render::warning(prompt.out(), "Invalid bet type."),
        Reply::Closed => return Ok(()),
    };

    if kind == BetKind::Number {
        render::wheel(prompt.out())?;
    }
    let selection = match prompt.ask_number::<u8>(render::selection_question(kind))? {
        Reply::Value(s) if kind.selection_range().contains(&s) => s,
        Reply::Value(_) | Reply::Invalid(_) => return render::warning(prompt.out(), "Invalid selection."),
        Reply::Closed => return Ok(()),
    };

    let table = &session.config().table;
    let question = format!("Enter bet amount (${}-${}): ", table.min_bet, table.max_bet);
    let amount = match prompt.ask_number::<i64>(&question)? {
        Reply::Value(a) => a,
        Reply::Invalid(_) => return render::warning(prompt.out(), "Invalid bet amount."),
        Reply::Closed => return Ok(()),
    };

    let result = Bet::new(kind, selection, amount).and_then(|bet| session.play(bet));
    match result {
        Ok(round) => {
            render::outcome(prompt.out(), &round)?;
            if !round.persisted {
                render::warning(prompt.out(), "Warning: this round could not be saved to disk.")?;
            }
            Ok(())
        }
        Err(e) => render::error(prompt.out(), &e),
    }
}

fn change_password<R, W, S, Wh>(prompt: &mut Prompter<R, W>, session: &mut Session<'_, S, Wh>) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    S: UserStore,
    Wh: SpinSource,
{
    let Some(current) = prompt.ask_line("Enter current password: ")? else {
        return Ok(());
    };
    let Some(new) = prompt.ask_line("Enter new password (min 6 characters): ")? else {
        return Ok(());
    };
    let Some(confirm) = prompt.ask_line("Confirm new password: ")? else {
        return Ok(());
    };
    match session.change_password(&current, &new, &confirm) {
        Ok(true) => render::notice(prompt.out(), "Password changed successfully!"),
        Ok(false) => render::warning(
            prompt.out(),
            "Password changed for this session, but it could not be saved.",
        ),
        Err(e) => render::error(prompt.out(), &e),
    }
}

fn admin_menu<R, W, S, Wh>(prompt: &mut Prompter<R, W>, session: &mut Session<'_, S, Wh>) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    S: UserStore,
    Wh: SpinSource,
{
    loop {
        render::admin_menu(prompt.out())?;
        match prompt.ask_number::<u8>("Enter your choice: ")? {
            Reply::Closed | Reply::Value(4) => return Ok(()),
            Reply::Value(1) => {
                let Some(target) = prompt.ask_line("Enter username to reset balance: ")? else {
                    return Ok(());
                };
                match session.reset_balance(&target) {
                    Ok(()) => {
                        let msg = format!(
                            "Balance for {target} reset to ${}.",
                            session.config().table.starting_balance
                        );
                        render::notice(prompt.out(), &msg)?
                    }
                    Err(e) => render::error(prompt.out(), &e)?,
                }
            }
            Reply::Value(2) => match session.list_users() {
                Ok(users) => render::users_table(prompt.out(), &users)?,
                Err(e) => render::error(prompt.out(), &e)?,
            },
            Reply::Value(3) => {
                let Some(target) = prompt.ask_line("Enter username to promote: ")? else {
                    return Ok(());
                };
                match session.promote(&target) {
                    Ok(()) => render::notice(prompt.out(), &format!("{target} is now an admin."))?,
                    Err(e @ CasinoError::NotFound(_)) => render::error(prompt.out(), &e)?,
                    Err(e) => {
                        warn!(error = %e, "promotion failed");
                        render::error(prompt.out(), &e)?
                    }
                }
            }
            Reply::Value(_) | Reply::Invalid(_) => render::warning(prompt.out(), "Invalid choice.")?,
        }
    }
}
