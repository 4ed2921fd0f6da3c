mod record;
mod r#type;
mod value;

pub use r#type::*;
pub use record::*;
pub use value::*;
