use std::fmt::{self, Display};

use crate::{base64, error::Result, spec::BinarySubtype, Error};

/// Represents a BSON binary value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binary {
    /// The subtype of the bytes.
    pub subtype: BinarySubtype,

    /// The binary bytes.
    pub bytes: Vec<u8>,
}

impl Display for Binary {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            fmt,
            "Binary({:#x}, {})",
            u8::from(self.subtype),
            base64::encode(&self.bytes)
        )
    }
}

impl Binary {
    /// Creates a [`Binary`] from a base64 string and optional [`BinarySubtype`]. If the
    /// `subtype` argument is [`None`], the [`Binary`] constructed will default to
    /// [`BinarySubtype::Generic`].
    pub fn from_base64(
        input: impl AsRef<str>,
        subtype: impl Into<Option<BinarySubtype>>,
    ) -> Result<Self> {
        let bytes = base64::decode(input.as_ref()).map_err(|e| {
            Error::malformed_value(format!("invalid base64 in binary value: {e}"))
        })?;
        Ok(Binary {
            subtype: subtype.into().unwrap_or(BinarySubtype::Generic),
            bytes,
        })
    }

    /// The base64 encoding of this value's bytes.
    pub fn to_base64(&self) -> String {
        base64::encode(&self.bytes)
    }
}
