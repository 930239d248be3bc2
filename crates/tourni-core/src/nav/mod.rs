//! Navigation: the view table, role guards and the header/sidebar shell.

pub mod guard;
pub mod route;
pub mod shell;

pub use guard::{can_access, can_access_with, guard, GuardDecision, RoleRequirement};
pub use route::Route;
pub use shell::{HeaderControl, NavLink, Shell};
