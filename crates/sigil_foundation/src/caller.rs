//! Caller identity and delivery channels.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use crate::error::{Error, ErrorKind};

/// The already-authenticated identity a command line arrived from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Caller {
    /// Stable identifier used for grants and comparisons.
    pub id: String,
    /// Human-readable name.
    pub name: String,
}

impl Caller {
    /// Creates a caller whose name equals its id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Where a command line was delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Channel {
    /// A shared room visible to many callers.
    Public,
    /// A direct message.
    Private,
    /// The local operator console.
    Console,
}

impl Channel {
    const fn bit(self) -> u8 {
        match self {
            Self::Public => 0b001,
            Self::Private => 0b010,
            Self::Console => 0b100,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Console => "console",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Channel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            "console" => Ok(Self::Console),
            other => Err(Error::new(ErrorKind::Config(format!(
                "unknown channel: {other}"
            )))),
        }
    }
}

/// The set of channels a command signature accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelSet(u8);

impl ChannelSet {
    /// No channels.
    pub const NONE: Self = Self(0);
    /// Public rooms only.
    pub const PUBLIC: Self = Self(Channel::Public.bit());
    /// Direct messages only.
    pub const PRIVATE: Self = Self(Channel::Private.bit());
    /// The console only.
    pub const CONSOLE: Self = Self(Channel::Console.bit());
    /// Every channel.
    pub const ALL: Self = Self(0b111);

    /// Returns true if the set contains `channel`.
    #[must_use]
    pub const fn contains(self, channel: Channel) -> bool {
        self.0 & channel.bit() != 0
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for ChannelSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl From<Channel> for ChannelSet {
    fn from(channel: Channel) -> Self {
        Self(channel.bit())
    }
}
