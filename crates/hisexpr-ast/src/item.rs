//! Data items, variables, modifiers and named values

use crate::{Signature, ValueType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Kind of metadata object an identifier refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdKind {
    DataElement,
    DataElementGroup,
    CategoryOptionCombo,
    CategoryOptionGroup,
    AttributeOptionCombo,
    Program,
    ProgramStage,
    Attribute,
    ProgramIndicator,
    DataSet,
    ReportingRateMetric,
    Constant,
    Indicator,
    OrgUnitGroup,
}

impl IdKind {
    /// Resolve an identifier tag such as `deGroup:`
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "deGroup" => Self::DataElementGroup,
            "coGroup" => Self::CategoryOptionGroup,
            "co" => Self::CategoryOptionCombo,
            "ao" => Self::AttributeOptionCombo,
            _ => return None,
        })
    }
}

/// The syntactic form of a data item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataItemType {
    /// `#{de.coc.aoc}`
    DataElementOperand,
    /// `#{stage.de}`
    ProgramStageDataElement,
    /// `D{program.de}`
    ProgramDataElement,
    /// `A{program.attribute}` or `A{attribute}`
    ProgramAttribute,
    /// `I{programIndicator}`
    ProgramIndicator,
    /// `R{dataSet.metric}`
    ReportingRate,
    /// `C{constant}`
    Constant,
    /// `N{indicator}`
    Indicator,
    /// `OUG{group}`
    OrgUnitGroup,
    /// `PS_EVENTDATE:stage`
    ProgramStageEventDate,
}

impl DataItemType {
    pub const ALL: &'static [DataItemType] = &[
        Self::DataElementOperand,
        Self::ProgramStageDataElement,
        Self::ProgramDataElement,
        Self::ProgramAttribute,
        Self::ProgramIndicator,
        Self::ReportingRate,
        Self::Constant,
        Self::Indicator,
        Self::OrgUnitGroup,
        Self::ProgramStageEventDate,
    ];

    /// Opening text of the item
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::DataElementOperand | Self::ProgramStageDataElement => "#{",
            Self::ProgramDataElement => "D{",
            Self::ProgramAttribute => "A{",
            Self::ProgramIndicator => "I{",
            Self::ReportingRate => "R{",
            Self::Constant => "C{",
            Self::Indicator => "N{",
            Self::OrgUnitGroup => "OUG{",
            Self::ProgramStageEventDate => "PS_EVENTDATE:",
        }
    }

    /// Closing text of the item
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::ProgramStageEventDate => "",
            _ => "}",
        }
    }

    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::ProgramStageDataElement | Self::ProgramAttribute => ValueType::Mixed,
            Self::ProgramStageEventDate => ValueType::Date,
            _ => ValueType::Number,
        }
    }

    /// Expected identifier kinds per dot-separated position.
    ///
    /// Positions past the first are optional.
    pub const fn positions(&self) -> &'static [IdKind] {
        match self {
            Self::DataElementOperand => &[
                IdKind::DataElement,
                IdKind::CategoryOptionCombo,
                IdKind::AttributeOptionCombo,
            ],
            Self::ProgramStageDataElement => &[IdKind::ProgramStage, IdKind::DataElement],
            Self::ProgramDataElement => &[IdKind::Program, IdKind::DataElement],
            Self::ProgramAttribute => &[IdKind::Program, IdKind::Attribute],
            Self::ProgramIndicator => &[IdKind::ProgramIndicator],
            Self::ReportingRate => &[IdKind::DataSet, IdKind::ReportingRateMetric],
            Self::Constant => &[IdKind::Constant],
            Self::Indicator => &[IdKind::Indicator],
            Self::OrgUnitGroup => &[IdKind::OrgUnitGroup],
            Self::ProgramStageEventDate => &[IdKind::ProgramStage],
        }
    }

    /// Minimum number of identifier groups
    pub const fn min_groups(&self) -> usize {
        match self {
            Self::ProgramStageDataElement
            | Self::ProgramDataElement
            | Self::ReportingRate => 2,
            _ => 1,
        }
    }
}

/// One dot-separated position of a data item: one or more `&`-joined ids
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdGroup {
    pub kind: IdKind,
    /// Tag written before the ids, e.g. `deGroup`
    pub tag: Option<String>,
    pub ids: SmallVec<[String; 1]>,
}

impl IdGroup {
    pub fn single(kind: IdKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            tag: None,
            ids: SmallVec::from_elem(id.into(), 1),
        }
    }
}

impl fmt::Display for IdGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tag) = &self.tag {
            write!(f, "{tag}:")?;
        }
        f.write_str(&self.ids.join("&"))
    }
}

/// A reference to external metadata
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataItem {
    pub item_type: DataItemType,
    pub groups: SmallVec<[IdGroup; 3]>,
    /// Resolved modifiers; only filled on items collected from a tree
    pub query_mods: Option<QueryMods>,
}

impl DataItem {
    pub fn new(item_type: DataItemType, groups: impl IntoIterator<Item = IdGroup>) -> Self {
        Self {
            item_type,
            groups: groups.into_iter().collect(),
            query_mods: None,
        }
    }

    /// Convenience constructor from plain ids, one per position
    pub fn of(item_type: DataItemType, ids: &[&str]) -> Self {
        let groups = item_type
            .positions()
            .iter()
            .zip(ids)
            .map(|(kind, id)| IdGroup::single(*kind, *id));
        Self::new(item_type, groups)
    }

    /// The same item without modifiers
    pub fn base(&self) -> Self {
        Self {
            query_mods: None,
            ..self.clone()
        }
    }

    pub fn with_query_mods(mut self, query_mods: Option<QueryMods>) -> Self {
        self.query_mods = query_mods;
        self
    }

    /// All identifiers referenced, in order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(|group| group.ids.iter().map(String::as_str))
    }
}

impl fmt::Display for DataItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.item_type.prefix())?;
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{group}")?;
        }
        f.write_str(self.item_type.suffix())
    }
}

/// Aggregation types accepted by `.aggregationType(...)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationType {
    Sum,
    Average,
    AverageSumOrgUnit,
    Last,
    LastAverageOrgUnit,
    LastInPeriod,
    LastInPeriodAverageOrgUnit,
    First,
    FirstAverageOrgUnit,
    Count,
    Stddev,
    Variance,
    Min,
    Max,
    MinSumOrgUnit,
    MaxSumOrgUnit,
    None,
    Custom,
    Default,
}

impl AggregationType {
    pub const ALL: &'static [AggregationType] = &[
        Self::Sum,
        Self::Average,
        Self::AverageSumOrgUnit,
        Self::Last,
        Self::LastAverageOrgUnit,
        Self::LastInPeriod,
        Self::LastInPeriodAverageOrgUnit,
        Self::First,
        Self::FirstAverageOrgUnit,
        Self::Count,
        Self::Stddev,
        Self::Variance,
        Self::Min,
        Self::Max,
        Self::MinSumOrgUnit,
        Self::MaxSumOrgUnit,
        Self::None,
        Self::Custom,
        Self::Default,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sum => "SUM",
            Self::Average => "AVERAGE",
            Self::AverageSumOrgUnit => "AVERAGE_SUM_ORG_UNIT",
            Self::Last => "LAST",
            Self::LastAverageOrgUnit => "LAST_AVERAGE_ORG_UNIT",
            Self::LastInPeriod => "LAST_IN_PERIOD",
            Self::LastInPeriodAverageOrgUnit => "LAST_IN_PERIOD_AVERAGE_ORG_UNIT",
            Self::First => "FIRST",
            Self::FirstAverageOrgUnit => "FIRST_AVERAGE_ORG_UNIT",
            Self::Count => "COUNT",
            Self::Stddev => "STDDEV",
            Self::Variance => "VARIANCE",
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::MinSumOrgUnit => "MIN_SUM_ORG_UNIT",
            Self::MaxSumOrgUnit => "MAX_SUM_ORG_UNIT",
            Self::None => "NONE",
            Self::Custom => "CUSTOM",
            Self::Default => "DEFAULT",
        }
    }
}

/// Dot-modifiers that change how a data item is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataItemModifier {
    AggregationType,
    MaxDate,
    MinDate,
    PeriodOffset,
    StageOffset,
    YearToDate,
    /// Added to items inside an aggregating function; never written
    PeriodAggregation,
}

impl DataItemModifier {
    pub const ALL: &'static [DataItemModifier] = &[
        Self::AggregationType,
        Self::MaxDate,
        Self::MinDate,
        Self::PeriodOffset,
        Self::StageOffset,
        Self::YearToDate,
        Self::PeriodAggregation,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.name() == name)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::AggregationType => "aggregationType",
            Self::MaxDate => "maxDate",
            Self::MinDate => "minDate",
            Self::PeriodOffset => "periodOffset",
            Self::StageOffset => "stageOffset",
            Self::YearToDate => "yearToDate",
            Self::PeriodAggregation => "periodAggregation",
        }
    }

    pub const fn signature(&self) -> Signature {
        match self {
            Self::AggregationType => Signature::new(ValueType::Mixed, &[ValueType::String]),
            Self::MaxDate | Self::MinDate => Signature::new(ValueType::Mixed, &[ValueType::Date]),
            Self::PeriodOffset | Self::StageOffset => {
                Signature::new(ValueType::Mixed, &[ValueType::Number])
            }
            Self::YearToDate | Self::PeriodAggregation => Signature::new(ValueType::Mixed, &[]),
        }
    }
}

/// Resolved data-item modifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryMods {
    pub period_aggregation: bool,
    pub aggregation_type: Option<AggregationType>,
    pub max_date: Option<NaiveDate>,
    pub min_date: Option<NaiveDate>,
    pub period_offset: i64,
    pub stage_offset: i64,
    pub year_to_date: bool,
}

/// Program variables referenced as `V{name}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgramVariable {
    AnalyticsPeriodEnd,
    AnalyticsPeriodStart,
    CompletedDate,
    CreationDate,
    CurrentDate,
    DueDate,
    EnrollmentCount,
    EnrollmentDate,
    EnrollmentId,
    EnrollmentStatus,
    Environment,
    EventCount,
    EventDate,
    EventId,
    EventStatus,
    ExecutionDate,
    IncidentDate,
    OrgUnit,
    OrgUnitCode,
    OrgUnitCount,
    ProgramName,
    ProgramStageId,
    ProgramStageName,
    SyncDate,
    TeiCount,
    ValueCount,
    ZeroPosValueCount,
}

impl ProgramVariable {
    pub const ALL: &'static [ProgramVariable] = &[
        Self::AnalyticsPeriodEnd,
        Self::AnalyticsPeriodStart,
        Self::CompletedDate,
        Self::CreationDate,
        Self::CurrentDate,
        Self::DueDate,
        Self::EnrollmentCount,
        Self::EnrollmentDate,
        Self::EnrollmentId,
        Self::EnrollmentStatus,
        Self::Environment,
        Self::EventCount,
        Self::EventDate,
        Self::EventId,
        Self::EventStatus,
        Self::ExecutionDate,
        Self::IncidentDate,
        Self::OrgUnit,
        Self::OrgUnitCode,
        Self::OrgUnitCount,
        Self::ProgramName,
        Self::ProgramStageId,
        Self::ProgramStageName,
        Self::SyncDate,
        Self::TeiCount,
        Self::ValueCount,
        Self::ZeroPosValueCount,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.name() == name)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::AnalyticsPeriodEnd => "analytics_period_end",
            Self::AnalyticsPeriodStart => "analytics_period_start",
            Self::CompletedDate => "completed_date",
            Self::CreationDate => "creation_date",
            Self::CurrentDate => "current_date",
            Self::DueDate => "due_date",
            Self::EnrollmentCount => "enrollment_count",
            Self::EnrollmentDate => "enrollment_date",
            Self::EnrollmentId => "enrollment_id",
            Self::EnrollmentStatus => "enrollment_status",
            Self::Environment => "environment",
            Self::EventCount => "event_count",
            Self::EventDate => "event_date",
            Self::EventId => "event_id",
            Self::EventStatus => "event_status",
            Self::ExecutionDate => "execution_date",
            Self::IncidentDate => "incident_date",
            Self::OrgUnit => "org_unit",
            Self::OrgUnitCode => "org_unit_code",
            Self::OrgUnitCount => "org_unit_count",
            Self::ProgramName => "program_name",
            Self::ProgramStageId => "program_stage_id",
            Self::ProgramStageName => "program_stage_name",
            Self::SyncDate => "sync_date",
            Self::TeiCount => "tei_count",
            Self::ValueCount => "value_count",
            Self::ZeroPosValueCount => "zero_pos_value_count",
        }
    }

    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::AnalyticsPeriodEnd
            | Self::AnalyticsPeriodStart
            | Self::CompletedDate
            | Self::CreationDate
            | Self::CurrentDate
            | Self::DueDate
            | Self::EnrollmentDate
            | Self::EventDate
            | Self::ExecutionDate
            | Self::IncidentDate
            | Self::SyncDate => ValueType::Date,
            Self::EnrollmentCount
            | Self::EventCount
            | Self::OrgUnitCount
            | Self::TeiCount
            | Self::ValueCount
            | Self::ZeroPosValueCount => ValueType::Number,
            _ => ValueType::String,
        }
    }
}

/// Target of a variable node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableRef {
    /// `V{name}`
    Program(ProgramVariable),
    /// `#{name}` or `A{name}` where the body is not an identifier path
    Rule(String),
}

/// Bracketed named values such as `[days]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedValue {
    /// Number of days in the period being evaluated
    Days,
}

impl NamedValue {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "days" => Some(Self::Days),
            _ => None,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Days => "days",
        }
    }

    pub const fn value_type(&self) -> ValueType {
        ValueType::Number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_item_display() {
        let item = DataItem::of(DataItemType::DataElementOperand, &["FTRrcoaog83", "HllvX50cXC0"]);
        assert_eq!(item.to_string(), "#{FTRrcoaog83.HllvX50cXC0}");

        let event_date = DataItem::of(DataItemType::ProgramStageEventDate, &["Zj7UnCAulEk"]);
        assert_eq!(event_date.to_string(), "PS_EVENTDATE:Zj7UnCAulEk");
    }

    #[test]
    fn test_tagged_group_display() {
        let mut group = IdGroup::single(IdKind::DataElementGroup, "oDkJh5Ddh7d");
        group.tag = Some("deGroup".to_string());
        group.ids.push("s46m5MS0hxu".to_string());
        assert_eq!(group.to_string(), "deGroup:oDkJh5Ddh7d&s46m5MS0hxu");
    }

    #[test]
    fn test_base_drops_modifiers() {
        let item = DataItem::of(DataItemType::Constant, &["bWEgzTHB7Uv"]).with_query_mods(Some(
            QueryMods {
                period_offset: 1,
                ..QueryMods::default()
            },
        ));
        assert_eq!(item.base(), DataItem::of(DataItemType::Constant, &["bWEgzTHB7Uv"]));
    }

    #[test]
    fn test_catalog_lookups() {
        assert_eq!(ProgramVariable::from_name("event_count"), Some(ProgramVariable::EventCount));
        assert_eq!(ProgramVariable::EventDate.value_type(), ValueType::Date);
        assert_eq!(AggregationType::from_name("AVERAGE"), Some(AggregationType::Average));
        assert_eq!(DataItemModifier::from_name("stageOffset"), Some(DataItemModifier::StageOffset));
        assert_eq!(NamedValue::from_name("days"), Some(NamedValue::Days));
    }
}
