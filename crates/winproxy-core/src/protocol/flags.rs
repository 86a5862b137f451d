//! Connection flags stored in the third `i32` of the settings record.
//!
//! Each [`Flag`] is one independent capability.  Any combination is legal on
//! the wire, even ones that look redundant (e.g. `Direct | Proxy`, which is
//! what Windows itself writes when a proxy is enabled).
//!
//! [`ConnectionFlags`] is a `bitflags` set backed by the raw integer.  Bits
//! that do not correspond to a known flag are kept as-is (`from_bits_retain`)
//! so that a decode/encode round trip never clears something a newer Windows
//! build has set.

use std::fmt;
use std::ops::BitOr;

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One capability bit of the connection flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Flag {
    /// Connect without any proxy.
    Direct = 1 << 0,
    /// Use the explicit proxy address.
    Proxy = 1 << 1,
    /// Use the auto-configuration script address.
    AutoScript = 1 << 2,
    /// Probe the network for proxy settings (WPAD).
    AutoDetect = 1 << 3,
}

impl Flag {
    /// Every known flag, in bit order.
    pub const ALL: [Flag; 4] = [Flag::Direct, Flag::Proxy, Flag::AutoScript, Flag::AutoDetect];

    /// Returns the mask for this flag.
    pub const fn bit(self) -> i32 {
        self as i32
    }

    /// Returns a short lowercase name, used in logs and rendered output.
    pub const fn name(self) -> &'static str {
        match self {
            Flag::Direct => "direct",
            Flag::Proxy => "proxy",
            Flag::AutoScript => "auto_script",
            Flag::AutoDetect => "auto_detect",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// A set of [`Flag`]s with bit-identical serialization to the raw `i32`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ConnectionFlags: i32 {
        const DIRECT = Flag::Direct.bit();
        const PROXY = Flag::Proxy.bit();
        const AUTO_SCRIPT = Flag::AutoScript.bit();
        const AUTO_DETECT = Flag::AutoDetect.bit();
    }
}

impl ConnectionFlags {
    /// Iterates over the known flags that are set, in bit order.
    pub fn known_flags(self) -> impl Iterator<Item = Flag> {
        Flag::ALL
            .into_iter()
            .filter(move |flag| self.contains((*flag).into()))
    }

    /// Returns the bits that do not map to any known [`Flag`].
    pub const fn unknown_bits(self) -> i32 {
        self.bits() & !Self::all().bits()
    }
}

impl Default for ConnectionFlags {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Flag> for ConnectionFlags {
    fn from(flag: Flag) -> Self {
        Self::from_bits_retain(flag.bit())
    }
}

impl BitOr for Flag {
    type Output = ConnectionFlags;

    fn bitor(self, rhs: Flag) -> ConnectionFlags {
        ConnectionFlags::from(self) | ConnectionFlags::from(rhs)
    }
}

impl BitOr<Flag> for ConnectionFlags {
    type Output = ConnectionFlags;

    fn bitor(self, rhs: Flag) -> ConnectionFlags {
        self | ConnectionFlags::from(rhs)
    }
}

impl FromIterator<Flag> for ConnectionFlags {
    fn from_iter<I: IntoIterator<Item = Flag>>(iter: I) -> Self {
        iter.into_iter().map(ConnectionFlags::from).collect()
    }
}

// Serialized as the raw integer, unknown bits included.
impl Serialize for ConnectionFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ConnectionFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i32::deserialize(deserializer).map(Self::from_bits_retain)
    }
}

impl fmt::Display for ConnectionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for flag in self.known_flags() {
            if !first {
                f.write_str("|")?;
            }
            write!(f, "{flag}")?;
            first = false;
        }
        if self.unknown_bits() != 0 {
            if !first {
                f.write_str("|")?;
            }
            write!(f, "0x{:X}", self.unknown_bits())?;
            first = false;
        }
        if first {
            f.write_str("none")?;
        }
        Ok(())
    }
}
