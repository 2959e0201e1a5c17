//! Domain models for the headache diary.

mod entry;
mod medication;
mod mutation;
mod symptom;
mod user;
mod validation;
mod values;

pub use entry::*;
pub use medication::*;
pub use mutation::*;
pub use symptom::*;
pub use user::*;
pub use validation::*;
pub use values::*;
