use crate::station::Quantity;

/// Setting whose raw value could not be mapped onto its enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Setting {
    Band,
    Class,
    TxPower,
    DataRate,
    Switch,
    AuthMode,
    Decimals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The modem did not acknowledge the connectivity probe.
    UartFailure,
    /// An operation needing the stored configuration ran before `init`.
    Uninitialized,
    /// The serial link itself failed.
    Serial(embedded_io::ErrorKind),
    /// A rendered command does not fit the line buffer.
    CommandOverflow,
    /// A reply was too short or not shaped like the expected answer.
    MalformedReply,
    Unmapped { setting: Setting, value: u8 },
    /// The bounded busy-wait ran past its deadline without a `Done` marker.
    TxTimeout,
    InvalidReading(Quantity),
}

/// Status byte reported to the application and the debug log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StatusCode {
    Ok = 0,
    UartFailure = 1,
    Uninitialized = 2,
    Failed = 0xff,
}

impl From<&Error> for StatusCode {
    fn from(value: &Error) -> Self {
        match value {
            Error::UartFailure => StatusCode::UartFailure,
            Error::Uninitialized => StatusCode::Uninitialized,
            _ => StatusCode::Failed,
        }
    }
}

impl<T> From<&Result<T, Error>> for StatusCode {
    fn from(value: &Result<T, Error>) -> Self {
        match value {
            Ok(_) => StatusCode::Ok,
            Err(e) => e.into(),
        }
    }
}

pub(crate) fn serial_error<E: embedded_io::Error>(value: E) -> Error {
    Error::Serial(value.kind())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_follows_result() {
        let ok: Result<(), Error> = Ok(());
        assert_eq!(StatusCode::from(&ok), StatusCode::Ok);
        assert_eq!(StatusCode::from(&Err::<(), _>(Error::UartFailure)) as u8, 1);
        assert_eq!(StatusCode::from(&Err::<(), _>(Error::Uninitialized)) as u8, 2);
        assert_eq!(StatusCode::from(&Error::TxTimeout), StatusCode::Failed);
    }
}
