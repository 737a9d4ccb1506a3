pub mod bet;
pub mod config;
pub mod engine;
pub mod history;
pub mod password;
pub mod paytable;
pub mod pockets;
pub mod rng;
pub mod session;
pub mod spin;
pub mod store;

pub use crate::bet::{Bet, BetKind};
pub use crate::config::{AuthConfig, CasinoConfig, SessionConfig, StoreConfig, TableConfig};
pub use crate::engine::{bet_wins, resolve, resolve_with, Resolution};
pub use crate::history::History;
pub use crate::password::{deobfuscate, obfuscate, verify, verify_stored, PasswordScheme};
pub use crate::paytable::{Paytable, PaytableEntry};
pub use crate::pockets::{color_of, Pocket, RED_NUMBERS};
pub use crate::rng::{derive_floats, derive_hash_hex, random_server_seed, ProvablyFairRng};
pub use crate::session::{Casino, InactivityTimer, RoundOutcome, Session, Stats};
pub use crate::spin::{spin_once, spin_with_seeds, verify_spin, FairWheel, ScriptedWheel, SpinOutcome, SpinSource};
pub use crate::store::{FileUserStore, MemoryUserStore, UserStore};
