use quarry_core::err::Result;
pub use env_logger::{init, init_from_env};
pub use log::*;

mod limiting;
pub use limiting::*;

/// Configures the logger for the application, `RUST_LOG` overrides the
/// default `info` filter
pub fn init_logging() -> Result<()> {
    env_logger::try_init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    )?;
    Ok(())
}

/// Logging init function for tests
pub fn init_for_tests() {
    let res = env_logger::builder()
        .filter_module("quarry", LevelFilter::Trace)
        .is_test(true)
        .try_init();
    if let Err(err) = res {
        eprintln!("Failed to init logging: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use crate::{init_for_tests, init_logging};

    #[test]
    fn test_init_logging() {
        let res = init_logging();

        assert!(res.is_ok());

        // a second logger cannot be installed, this only reports to stderr
        init_for_tests();
    }
}
