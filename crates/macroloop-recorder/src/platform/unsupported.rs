//! No global input listener on this platform yet

use crate::hub::{InputSource, Subscription};
use macroloop_core::{Error, Result};

pub struct SystemInputSource;

impl SystemInputSource {
    pub fn new() -> Result<Self> {
        Err(Error::not_implemented("Global input listening"))
    }
}

impl InputSource for SystemInputSource {
    fn subscribe_with_capacity(&self, _capacity: usize) -> Result<Subscription> {
        Err(Error::not_implemented("Global input listening"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use macroloop_core::ErrorCode;

    #[test]
    fn reports_not_implemented() {
        assert_eq!(
            SystemInputSource::new().err().map(|e| e.code),
            Some(ErrorCode::NotImplemented)
        );
        assert!(SystemInputSource.subscribe().is_err());
    }
}
