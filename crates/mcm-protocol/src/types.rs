//! 线上基础类型
//!
//! 地址、通道和方向。传输层只认识字符串，这里的类型负责把它们规范成 token。

use std::fmt;

use crate::ProtocolError;

/// 控制器模块地址
///
/// 不做范围检查：整数和字符串都可以，最终都会被字符串化。
/// `Address::from(2)` 与 `Address::from("2")` 相等。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// 线上格式
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&Address> for Address {
    fn from(value: &Address) -> Self {
        value.clone()
    }
}

macro_rules! impl_from_int {
    ($target:ident: $($t:ty),*) => {
        $(
            impl From<$t> for $target {
                fn from(value: $t) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

impl_from_int!(Address: u8, u16, u32, u64, usize, i32, i64);

/// 模块内的子通道（CADM 等多通道模块使用）
///
/// 默认值为 `1`。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Channel(String);

impl Channel {
    pub fn new(channel: impl Into<String>) -> Self {
        Self(channel.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self("1".to_string())
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Channel {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Channel {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl_from_int!(Channel: u8, u16, u32, u64, usize, i32, i64);

/// 运动方向
///
/// 线上编码：Forward = 1，Backward = 0。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Direction {
    /// 正向（顺时针）
    Forward = 1,
    /// 反向（逆时针）
    Backward = 0,
}

impl Direction {
    /// 顺时针，等价于 `Forward`
    pub const CLOCKWISE: Direction = Direction::Forward;
    /// 逆时针，等价于 `Backward`
    pub const COUNTERCLOCKWISE: Direction = Direction::Backward;

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub(crate) fn token(self) -> String {
        self.as_u8().to_string()
    }
}

impl TryFrom<u8> for Direction {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Direction::Forward),
            0 => Ok(Direction::Backward),
            _ => Err(ProtocolError::InvalidValue {
                field: "Direction".to_string(),
                value: value.to_string(),
            }),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "forward" | "fwd" | "cw" | "clockwise" => Ok(Direction::Forward),
            "0" | "backward" | "back" | "ccw" | "counterclockwise" => Ok(Direction::Backward),
            _ => Err(ProtocolError::InvalidValue {
                field: "Direction".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_from_int_and_str_are_equal() {
        assert_eq!(Address::from(2), Address::from("2"));
        assert_eq!(Address::from(2u8).as_str(), "2");
        assert_eq!(Address::new("rack-a").to_string(), "rack-a");
    }

    #[test]
    fn test_channel_default_is_one() {
        assert_eq!(Channel::default().as_str(), "1");
        assert_eq!(Channel::from(3).as_str(), "3");
    }

    #[test]
    fn test_direction_wire_values() {
        assert_eq!(Direction::Forward.as_u8(), 1);
        assert_eq!(Direction::Backward.as_u8(), 0);
        assert_eq!(Direction::CLOCKWISE, Direction::Forward);
        assert_eq!(Direction::COUNTERCLOCKWISE, Direction::Backward);
    }

    #[test]
    fn test_direction_try_from_u8() {
        assert_eq!(Direction::try_from(1).unwrap(), Direction::Forward);
        assert_eq!(Direction::try_from(0).unwrap(), Direction::Backward);
        assert!(matches!(
            Direction::try_from(2),
            Err(ProtocolError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("cw".parse::<Direction>().unwrap(), Direction::Forward);
        assert_eq!("Backward".parse::<Direction>().unwrap(), Direction::Backward);
        assert!("sideways".parse::<Direction>().is_err());
    }
}
