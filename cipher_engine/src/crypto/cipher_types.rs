use crate::crypto::error::CipherError;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherMode {
    ECB,
    CBC,
    PCBC,
    CFB,
    OFB,
    CTR,
    RandomDelta,
}

impl CipherMode {
    pub const ALL: [CipherMode; 7] = [
        CipherMode::ECB,
        CipherMode::CBC,
        CipherMode::PCBC,
        CipherMode::CFB,
        CipherMode::OFB,
        CipherMode::CTR,
        CipherMode::RandomDelta,
    ];

    /// Modes that turn the block cipher into a keystream generator. They never
    /// pad and accept a short final block.
    pub fn is_stream_mode(self) -> bool {
        matches!(self, CipherMode::CFB | CipherMode::OFB | CipherMode::CTR)
    }

    pub fn requires_iv(self) -> bool {
        !matches!(self, CipherMode::ECB | CipherMode::RandomDelta)
    }
}

impl fmt::Display for CipherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CipherMode::ECB => "ECB",
            CipherMode::CBC => "CBC",
            CipherMode::PCBC => "PCBC",
            CipherMode::CFB => "CFB",
            CipherMode::OFB => "OFB",
            CipherMode::CTR => "CTR",
            CipherMode::RandomDelta => "RandomDelta",
        };
        f.write_str(name)
    }
}

impl FromStr for CipherMode {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "ecb" => Ok(CipherMode::ECB),
            "cbc" => Ok(CipherMode::CBC),
            "pcbc" => Ok(CipherMode::PCBC),
            "cfb" => Ok(CipherMode::CFB),
            "ofb" => Ok(CipherMode::OFB),
            "ctr" => Ok(CipherMode::CTR),
            "randomdelta" => Ok(CipherMode::RandomDelta),
            _ => Err(CipherError::UnsupportedMode(s.to_string())),
        }
    }
}

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaddingMode {
    Zeros,
    ANSI_X923,
    PKCS7,
    ISO10126,
}

impl PaddingMode {
    pub const ALL: [PaddingMode; 4] = [
        PaddingMode::Zeros,
        PaddingMode::ANSI_X923,
        PaddingMode::PKCS7,
        PaddingMode::ISO10126,
    ];
}

impl fmt::Display for PaddingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaddingMode::Zeros => "Zeros",
            PaddingMode::ANSI_X923 => "ANSI X9.23",
            PaddingMode::PKCS7 => "PKCS7",
            PaddingMode::ISO10126 => "ISO 10126",
        };
        f.write_str(name)
    }
}

impl FromStr for PaddingMode {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s
            .to_ascii_lowercase()
            .replace(['-', '_', ' ', '.'], "")
            .as_str()
        {
            "zeros" | "zero" => Ok(PaddingMode::Zeros),
            "ansix923" => Ok(PaddingMode::ANSI_X923),
            "pkcs7" => Ok(PaddingMode::PKCS7),
            "iso10126" => Ok(PaddingMode::ISO10126),
            _ => Err(CipherError::UnsupportedPadding(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

pub enum CipherInput {
    Bytes(Vec<u8>),
    File(PathBuf),
}

pub enum CipherOutput {
    Buffer(Box<Vec<u8>>),
    File(PathBuf),
}
