use std::fmt::{self, Debug};

/// Truncates the debug output of a value, used when logging query arguments
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MaxLogLength<'a, T: Debug> {
    limit: Option<usize>,
    val: &'a T,
}

impl<'a, T: Debug> MaxLogLength<'a, T> {
    pub fn new(limit: Option<usize>, val: &'a T) -> Self {
        Self { limit, val }
    }
}

impl<'a, T: Debug> Debug for MaxLogLength<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmt = format!("{:?}", self.val);

        match self.limit {
            Some(limit) if fmt.len() > limit => {
                let mut end = limit;
                while !fmt.is_char_boundary(end) {
                    end -= 1;
                }
                write!(f, "{}...", &fmt[..end])
            }
            _ => write!(f, "{}", fmt),
        }
    }
}
