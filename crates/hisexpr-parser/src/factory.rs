//! Node value decoders
//!
//! Every node kind has a decoder turning the node's raw text into its
//! [`NodeValue`]. The registry is total and passed into the parser
//! explicitly, so a host can replace how individual kinds are decoded.

use crate::terminal::{is_identifier, is_uid, is_variable_name};
use hisexpr_ast::{
    AggregationType, BinaryOp, DataItem, DataItemModifier, DataItemType, IdGroup, IdKind,
    NamedFunction, NamedValue, NodeKind, NodeValue, ProgramVariable, UnaryOp, VariableRef,
};
use hisexpr_types::parse_date;
use smallvec::SmallVec;

/// Turns raw node text into a node value
pub type Decoder = fn(&str) -> Result<NodeValue, String>;

/// Decoders for every [`NodeKind`]
#[derive(Debug, Clone)]
pub struct NodeFactories {
    decoders: [Decoder; NodeKind::ALL.len()],
}

impl Default for NodeFactories {
    fn default() -> Self {
        Self {
            decoders: std::array::from_fn(|i| default_decoder(NodeKind::ALL[i])),
        }
    }
}

impl NodeFactories {
    /// Replace the decoder for one kind
    pub fn with(mut self, kind: NodeKind, decoder: Decoder) -> Self {
        self.decoders[kind as usize] = decoder;
        self
    }

    pub fn get(&self, kind: NodeKind) -> Decoder {
        self.decoders[kind as usize]
    }
}

fn default_decoder(kind: NodeKind) -> Decoder {
    match kind {
        NodeKind::Par | NodeKind::Argument | NodeKind::Null => decode_none,
        NodeKind::Function => decode_function,
        NodeKind::Modifier => decode_modifier,
        NodeKind::DataItem => decode_any_data_item,
        NodeKind::Variable => decode_variable,
        NodeKind::BinaryOperator => decode_binary,
        NodeKind::UnaryOperator => decode_unary,
        NodeKind::Number => decode_number,
        NodeKind::Integer => decode_integer,
        NodeKind::String => decode_string,
        NodeKind::Date => decode_date,
        NodeKind::Uid => decode_uid,
        NodeKind::Identifier => decode_identifier,
        NodeKind::NamedValue => decode_named_value,
        NodeKind::Boolean => decode_boolean,
    }
}

fn decode_none(_: &str) -> Result<NodeValue, String> {
    Ok(NodeValue::None)
}

fn decode_function(raw: &str) -> Result<NodeValue, String> {
    NamedFunction::from_name(raw)
        .map(NodeValue::Function)
        .ok_or_else(|| format!("Unknown function `{raw}`"))
}

fn decode_modifier(raw: &str) -> Result<NodeValue, String> {
    DataItemModifier::from_name(raw)
        .map(NodeValue::Modifier)
        .ok_or_else(|| format!("Unknown modifier `{raw}`"))
}

fn decode_binary(raw: &str) -> Result<NodeValue, String> {
    BinaryOp::from_symbol(raw)
        .map(NodeValue::Binary)
        .ok_or_else(|| format!("Unknown operator `{raw}`"))
}

fn decode_unary(raw: &str) -> Result<NodeValue, String> {
    UnaryOp::from_symbol(raw)
        .map(NodeValue::Unary)
        .ok_or_else(|| format!("Unknown operator `{raw}`"))
}

fn decode_number(raw: &str) -> Result<NodeValue, String> {
    raw.parse::<f64>()
        .map(NodeValue::Number)
        .map_err(|_| format!("Invalid number `{raw}`"))
}

fn decode_integer(raw: &str) -> Result<NodeValue, String> {
    raw.parse::<i64>()
        .map(NodeValue::Integer)
        .map_err(|_| format!("Invalid integer `{raw}`"))
}

fn decode_string(raw: &str) -> Result<NodeValue, String> {
    unescape(unquote(raw)).map(NodeValue::String)
}

fn decode_date(raw: &str) -> Result<NodeValue, String> {
    parse_date(unquote(raw))
        .map(NodeValue::Date)
        .ok_or_else(|| format!("Invalid date `{raw}`"))
}

fn decode_uid(raw: &str) -> Result<NodeValue, String> {
    Ok(NodeValue::Uid(unquote(raw).to_string()))
}

fn decode_identifier(raw: &str) -> Result<NodeValue, String> {
    Ok(NodeValue::Identifier(raw.to_string()))
}

fn decode_boolean(raw: &str) -> Result<NodeValue, String> {
    match raw {
        "true" => Ok(NodeValue::Boolean(true)),
        "false" => Ok(NodeValue::Boolean(false)),
        _ => Err(format!("Invalid boolean `{raw}`")),
    }
}

fn decode_named_value(raw: &str) -> Result<NodeValue, String> {
    let name = raw.trim_start_matches('[').trim_end_matches(']');
    NamedValue::from_name(name)
        .map(NodeValue::NamedValue)
        .ok_or_else(|| format!("Unknown named value `{raw}`"))
}

/// `V{name}` is a program variable, `#{name}` and `A{name}` rule variables
fn decode_variable(raw: &str) -> Result<NodeValue, String> {
    let Some((prefix, rest)) = raw.split_once('{') else {
        return Err(format!("Invalid variable `{raw}`"));
    };
    let name = rest.strip_suffix('}').unwrap_or(rest);
    match prefix {
        "V" => ProgramVariable::from_name(name)
            .map(|v| NodeValue::Variable(VariableRef::Program(v)))
            .ok_or_else(|| format!("Unknown program variable `{name}`")),
        "#" | "A" if is_variable_name(name) => {
            Ok(NodeValue::Variable(VariableRef::Rule(name.to_string())))
        }
        _ => Err(format!("Invalid variable `{raw}`")),
    }
}

/// Without a known item type, take the first type whose syntax fits
fn decode_any_data_item(raw: &str) -> Result<NodeValue, String> {
    DataItemType::ALL
        .iter()
        .filter(|t| raw.starts_with(t.prefix()))
        .find_map(|t| decode_data_item(*t, raw).ok())
        .ok_or_else(|| format!("Invalid data item `{raw}`"))
}

/// Decoder for one item type
pub fn data_item_decoder(item_type: DataItemType) -> Decoder {
    match item_type {
        DataItemType::DataElementOperand => {
            |raw| decode_data_item(DataItemType::DataElementOperand, raw)
        }
        DataItemType::ProgramStageDataElement => {
            |raw| decode_data_item(DataItemType::ProgramStageDataElement, raw)
        }
        DataItemType::ProgramDataElement => {
            |raw| decode_data_item(DataItemType::ProgramDataElement, raw)
        }
        DataItemType::ProgramAttribute => {
            |raw| decode_data_item(DataItemType::ProgramAttribute, raw)
        }
        DataItemType::ProgramIndicator => {
            |raw| decode_data_item(DataItemType::ProgramIndicator, raw)
        }
        DataItemType::ReportingRate => |raw| decode_data_item(DataItemType::ReportingRate, raw),
        DataItemType::Constant => |raw| decode_data_item(DataItemType::Constant, raw),
        DataItemType::Indicator => |raw| decode_data_item(DataItemType::Indicator, raw),
        DataItemType::OrgUnitGroup => |raw| decode_data_item(DataItemType::OrgUnitGroup, raw),
        DataItemType::ProgramStageEventDate => {
            |raw| decode_data_item(DataItemType::ProgramStageEventDate, raw)
        }
    }
}

pub fn decode_data_item(item_type: DataItemType, raw: &str) -> Result<NodeValue, String> {
    let body = raw
        .strip_prefix(item_type.prefix())
        .and_then(|rest| rest.strip_suffix(item_type.suffix()))
        .ok_or_else(|| format!("Invalid data item `{raw}`"))?;
    parse_item_body(item_type, body)
        .map(NodeValue::DataItem)
        .map_err(|reason| format!("Invalid data item `{raw}`: {reason}"))
}

/// Split a body on `.` into identifier groups
pub fn parse_item_body(item_type: DataItemType, body: &str) -> Result<DataItem, String> {
    let segments: Vec<&str> = body.split('.').collect();
    let positions = item_type.positions();
    if segments.len() < item_type.min_groups() || segments.len() > positions.len() {
        return Err(format!(
            "expected between {} and {} identifiers",
            item_type.min_groups(),
            positions.len()
        ));
    }
    let groups = segments
        .iter()
        .zip(positions)
        .map(|(segment, kind)| {
            let kind = match (item_type, segments.len()) {
                (DataItemType::ProgramAttribute, 1) => IdKind::Attribute,
                _ => *kind,
            };
            parse_group(segment, kind)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DataItem::new(item_type, groups))
}

fn parse_group(segment: &str, kind: IdKind) -> Result<IdGroup, String> {
    let (tag, kind, ids) = match segment.split_once(':') {
        Some((tag, ids)) => {
            let kind = IdKind::from_tag(tag).ok_or_else(|| format!("unknown tag `{tag}`"))?;
            (Some(tag.to_string()), kind, ids)
        }
        None => (None, kind, segment),
    };
    let ids = ids
        .split('&')
        .map(|id| {
            let valid = is_uid(id) || (kind == IdKind::ReportingRateMetric && is_identifier(id));
            if valid {
                Ok(id.to_string())
            } else {
                Err(format!("`{id}` is not a valid identifier"))
            }
        })
        .collect::<Result<SmallVec<[String; 1]>, _>>()?;
    Ok(IdGroup { kind, tag, ids })
}

/// Strip one pair of matching quotes
pub fn unquote(raw: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = raw
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    raw
}

/// Decode `\\ \' \" \n \r \t \uXXXX`
pub fn unescape(text: &str) -> Result<String, String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or_else(|| format!("Invalid unicode escape `\\u{hex}`"))?;
                out.push(decoded);
            }
            Some(other) => return Err(format!("Invalid escape sequence `\\{other}`")),
            None => return Err("Unterminated escape sequence".to_string()),
        }
    }
    Ok(out)
}

/// Decoder for `.aggregationType(...)` arguments
pub fn decode_aggregation_type(raw: &str) -> Result<NodeValue, String> {
    AggregationType::from_name(raw)
        .map(NodeValue::AggregationType)
        .ok_or_else(|| format!("Unknown aggregation type `{raw}`"))
}
