//! 回复解码
//!
//! 控制器回复是 `key : value` 行组成的文本块。通用解码器把它拆成有序映射，
//! 每条指令的转换表决定哪些键要解析成整数。RST 例外，直接返回去掉首尾空白的原文。

use std::collections::BTreeMap;
use std::fmt;

use crate::ProtocolError;
use crate::code::CommandCode;

/// 字段值
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    Int(i64),
    Text(String),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            Value::Int(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
        }
    }
}

/// 结构化回复字段
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ResponseFields {
    fields: BTreeMap<String, Value>,
}

impl ResponseFields {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// 读取整数字段
    pub fn int(&self, key: &str) -> Result<i64, ProtocolError> {
        match self.fields.get(key) {
            Some(Value::Int(v)) => Ok(*v),
            Some(Value::Text(_)) => Err(ProtocolError::UnexpectedType {
                key: key.to_string(),
                expected: "integer",
            }),
            None => Err(ProtocolError::MissingField(key.to_string())),
        }
    }

    /// 读取文本字段
    pub fn text(&self, key: &str) -> Result<&str, ProtocolError> {
        match self.fields.get(key) {
            Some(Value::Text(v)) => Ok(v),
            Some(Value::Int(_)) => Err(ProtocolError::UnexpectedType {
                key: key.to_string(),
                expected: "text",
            }),
            None => Err(ProtocolError::MissingField(key.to_string())),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for ResponseFields {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// 解码后的回复
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Reply {
    /// `key : value` 结构化回复
    Fields(ResponseFields),
    /// 非结构化文本（仅 RST）
    Raw(String),
}

impl Reply {
    pub fn into_fields(self) -> Result<ResponseFields, ProtocolError> {
        match self {
            Reply::Fields(fields) => Ok(fields),
            Reply::Raw(text) => Err(ProtocolError::UnexpectedReply(text)),
        }
    }

    pub fn into_raw(self) -> Result<String, ProtocolError> {
        match self {
            Reply::Raw(text) => Ok(text),
            Reply::Fields(_) => Err(ProtocolError::UnexpectedReply(
                "structured reply where raw text was expected".to_string(),
            )),
        }
    }
}

/// 各指令回复的解码规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeRule {
    /// 通用 `key : value` 解码，列出的键转为整数
    Fields { int_keys: &'static [&'static str] },
    /// 原文
    Raw,
}

const NO_CONVERSIONS: &[&str] = &[];
const POS_INT_KEYS: &[&str] = &["POS", "RVL"];
const FBST_INT_KEYS: &[&str] = &[
    "ENABLED", "BUSY", "POS1", "POS2", "POS3", "ERR1", "ERR2", "ERR3",
];

impl CommandCode {
    /// 该指令回复的解码规则
    pub fn decode_rule(self) -> DecodeRule {
        match self {
            CommandCode::Pos => DecodeRule::Fields {
                int_keys: POS_INT_KEYS,
            },
            CommandCode::Fbst => DecodeRule::Fields {
                int_keys: FBST_INT_KEYS,
            },
            CommandCode::Rst => DecodeRule::Raw,
            CommandCode::Mov
            | CommandCode::Ext
            | CommandCode::Stp
            | CommandCode::Sts
            | CommandCode::Desc
            | CommandCode::Info
            | CommandCode::Fben
            | CommandCode::Fbxt
            | CommandCode::Fbcs
            | CommandCode::Fbes
            | CommandCode::Fbfe => DecodeRule::Fields {
                int_keys: NO_CONVERSIONS,
            },
        }
    }
}

/// 按指令码解码回复
///
/// `stdout` 会先去掉首尾空白。
pub fn decode(code: CommandCode, stdout: &str) -> Result<Reply, ProtocolError> {
    let body = stdout.trim();
    match code.decode_rule() {
        DecodeRule::Raw => Ok(Reply::Raw(body.to_string())),
        DecodeRule::Fields { int_keys } => parse_fields(body, int_keys).map(Reply::Fields),
    }
}

/// 通用 `key : value` 解析
///
/// - 空行跳过
/// - 只在第一个 `:` 处切分，值里可以再出现 `:`
/// - 非空且不含 `:` 的行视为格式错误
pub fn parse_fields(body: &str, int_keys: &[&str]) -> Result<ResponseFields, ProtocolError> {
    let mut fields = BTreeMap::new();
    for line in body.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| ProtocolError::MalformedLine(line.to_string()))?;
        let key = key.trim();
        let value = value.trim();
        let value = if int_keys.contains(&key) {
            let parsed = value.parse::<i64>().map_err(|_| ProtocolError::InvalidInteger {
                key: key.to_string(),
                value: value.to_string(),
            })?;
            Value::Int(parsed)
        } else {
            Value::Text(value.to_string())
        };
        fields.insert(key.to_string(), value);
    }
    Ok(ResponseFields { fields })
}
