//! C++ language standard levels.
//!
//! Settings carry the requested standard as a raw string (`"17"`, `"gnu20"`,
//! `"c++23"`); recipes declare the floor they need. Both are parsed into
//! [`CppStandard`] so they can be ordered.

use serde::{Deserialize, Serialize};

/// C++ standard version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CppStandard {
    /// C++98
    #[serde(rename = "98", alias = "c++98", alias = "cpp98", alias = "gnu98")]
    Cpp98,
    /// C++11
    #[serde(rename = "11", alias = "c++11", alias = "cpp11", alias = "gnu11")]
    Cpp11,
    /// C++14
    #[serde(rename = "14", alias = "c++14", alias = "cpp14", alias = "gnu14")]
    Cpp14,
    /// C++17
    #[serde(rename = "17", alias = "c++17", alias = "cpp17", alias = "gnu17")]
    Cpp17,
    /// C++20
    #[serde(rename = "20", alias = "c++20", alias = "cpp20", alias = "gnu20")]
    Cpp20,
    /// C++23
    #[serde(rename = "23", alias = "c++23", alias = "cpp23", alias = "gnu23")]
    Cpp23,
    /// C++26
    #[serde(rename = "26", alias = "c++26", alias = "cpp26", alias = "gnu26")]
    Cpp26,
}

impl CppStandard {
    /// The bare level number as used in settings (e.g., "20").
    pub fn as_number(&self) -> &'static str {
        match self {
            CppStandard::Cpp98 => "98",
            CppStandard::Cpp11 => "11",
            CppStandard::Cpp14 => "14",
            CppStandard::Cpp17 => "17",
            CppStandard::Cpp20 => "20",
            CppStandard::Cpp23 => "23",
            CppStandard::Cpp26 => "26",
        }
    }

    /// Get the standard as a GCC/Clang flag value (e.g., "c++20").
    pub fn as_flag_value(&self) -> &'static str {
        match self {
            CppStandard::Cpp98 => "c++98",
            CppStandard::Cpp11 => "c++11",
            CppStandard::Cpp14 => "c++14",
            CppStandard::Cpp17 => "c++17",
            CppStandard::Cpp20 => "c++20",
            CppStandard::Cpp23 => "c++23",
            CppStandard::Cpp26 => "c++26",
        }
    }
}

impl std::str::FromStr for CppStandard {
    type Err = CppStandardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let level = lowered
            .strip_prefix("gnu++")
            .or_else(|| lowered.strip_prefix("gnu"))
            .or_else(|| lowered.strip_prefix("c++"))
            .or_else(|| lowered.strip_prefix("cpp"))
            .unwrap_or(&lowered);

        // Draft names (`2a`, `1z`) count as the standard they became
        match level {
            "98" | "03" => Ok(CppStandard::Cpp98),
            "11" | "0x" => Ok(CppStandard::Cpp11),
            "14" | "1y" => Ok(CppStandard::Cpp14),
            "17" | "1z" => Ok(CppStandard::Cpp17),
            "20" | "2a" => Ok(CppStandard::Cpp20),
            "23" | "2b" => Ok(CppStandard::Cpp23),
            "26" | "2c" => Ok(CppStandard::Cpp26),
            _ => Err(CppStandardParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid C++ standard string.
#[derive(Debug, Clone)]
pub struct CppStandardParseError(pub String);

impl std::fmt::Display for CppStandardParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid C++ standard '{}', valid values: 98 to 26, optionally gnu-prefixed",
            self.0
        )
    }
}

impl std::error::Error for CppStandardParseError {}

impl std::fmt::Display for CppStandard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "C++{}", self.as_number())
    }
}
