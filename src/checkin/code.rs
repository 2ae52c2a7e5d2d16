use std::fmt;

use thiserror::Error;

use crate::domain::CodeType;

pub const MANUAL_CODE_LEN: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeError {
    #[error("Ticket code must be exactly 7 digits")]
    NotSevenDigits,
    #[error("Scanned code is empty")]
    Empty,
}

/// A ticket code ready to be checked, tagged with how it was captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketCode {
    value: String,
    kind: CodeType,
}

impl TicketCode {
    /// Typed at the desk: exactly seven ASCII digits, surrounding whitespace
    /// ignored.
    pub fn manual(raw: &str) -> Result<Self, CodeError> {
        let trimmed = raw.trim();
        if trimmed.len() != MANUAL_CODE_LEN || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodeError::NotSevenDigits);
        }
        Ok(Self {
            value: trimmed.to_string(),
            kind: CodeType::Manual,
        })
    }

    /// Decoded from a QR image; any non-empty payload is passed through.
    pub fn scanned(raw: &str) -> Result<Self, CodeError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CodeError::Empty);
        }
        Ok(Self {
            value: trimmed.to_string(),
            kind: CodeType::Qr,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> CodeType {
        self.kind
    }
}

impl fmt::Display for TicketCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_codes_are_seven_digits() {
        assert_eq!(TicketCode::manual(" 0012345 ").unwrap().as_str(), "0012345");
        assert_eq!(TicketCode::manual("123456"), Err(CodeError::NotSevenDigits));
        assert_eq!(TicketCode::manual("12345678"), Err(CodeError::NotSevenDigits));
        assert_eq!(TicketCode::manual("12a4567"), Err(CodeError::NotSevenDigits));
        assert_eq!(TicketCode::manual("１２３４５６７"), Err(CodeError::NotSevenDigits));
    }

    #[test]
    fn scanned_codes_keep_their_payload() {
        let code = TicketCode::scanned("INV-9F2C-77\n").unwrap();
        assert_eq!(code.as_str(), "INV-9F2C-77");
        assert_eq!(code.kind(), CodeType::Qr);
        assert_eq!(TicketCode::scanned("  "), Err(CodeError::Empty));
    }
}
