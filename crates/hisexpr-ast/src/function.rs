//! Function catalog with declared signatures

use crate::ValueType;
use serde::{Deserialize, Serialize};

/// Declared signature of a function or modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub returns: ValueType,
    pub params: &'static [ValueType],
    /// The last parameter may repeat
    pub varargs: bool,
}

impl Signature {
    pub const fn new(returns: ValueType, params: &'static [ValueType]) -> Self {
        Self {
            returns,
            params,
            varargs: false,
        }
    }

    pub const fn varargs(returns: ValueType, params: &'static [ValueType]) -> Self {
        Self {
            returns,
            params,
            varargs: true,
        }
    }

    /// Expected type of the argument at `index`; varargs reuse the last declared type
    pub fn param_type(&self, index: usize) -> ValueType {
        match self.params.get(index) {
            Some(t) => *t,
            None if self.varargs => self.params.last().copied().unwrap_or(ValueType::Mixed),
            None => ValueType::Mixed,
        }
    }

    /// Whether arguments bound to `Same` positions must agree on one type
    pub fn has_same_group(&self) -> bool {
        let same = self.params.iter().filter(|t| **t == ValueType::Same).count();
        same > 1 || (self.varargs && self.params.last() == Some(&ValueType::Same))
    }
}

use ValueType::{Boolean as B, Date as D, Mixed as M, Number as N, Same as S, String as T};

/// All functions known to any dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedFunction {
    // Common
    FirstNonNull,
    Greatest,
    If,
    IsNotNull,
    IsNull,
    Least,
    Log,
    Log10,
    RemoveZeros,
    Contains,
    ContainsItems,

    // Organisation unit
    OrgUnitAncestor,
    OrgUnitDataSet,
    OrgUnitGroup,
    OrgUnitProgram,

    // Aggregates
    Avg,
    Count,
    Max,
    Median,
    Min,
    PercentileCont,
    Stddev,
    StddevPop,
    StddevSamp,
    Sum,
    Variance,

    // Program rule functions
    D2AddDays,
    D2Ceil,
    D2Concatenate,
    D2Condition,
    D2Count,
    D2CountIfValue,
    D2CountIfZeroPos,
    D2DaysBetween,
    D2ExtractDataMatrixValue,
    D2Floor,
    D2HasUserRole,
    D2HasValue,
    D2InOrgUnitGroup,
    D2LastEventDate,
    D2Left,
    D2Length,
    D2MaxValue,
    D2MinValue,
    D2MinutesBetween,
    D2Modulus,
    D2MonthsBetween,
    D2Oizp,
    D2Right,
    D2Round,
    D2Split,
    D2Substring,
    D2ValidatePattern,
    D2WeeksBetween,
    D2YearsBetween,
    D2Zing,
    D2Zpvc,
    D2ZScoreHfa,
    D2ZScoreWfa,
    D2ZScoreWfh,
}

impl NamedFunction {
    pub const ALL: &'static [NamedFunction] = &[
        Self::FirstNonNull,
        Self::Greatest,
        Self::If,
        Self::IsNotNull,
        Self::IsNull,
        Self::Least,
        Self::Log,
        Self::Log10,
        Self::RemoveZeros,
        Self::Contains,
        Self::ContainsItems,
        Self::OrgUnitAncestor,
        Self::OrgUnitDataSet,
        Self::OrgUnitGroup,
        Self::OrgUnitProgram,
        Self::Avg,
        Self::Count,
        Self::Max,
        Self::Median,
        Self::Min,
        Self::PercentileCont,
        Self::Stddev,
        Self::StddevPop,
        Self::StddevSamp,
        Self::Sum,
        Self::Variance,
        Self::D2AddDays,
        Self::D2Ceil,
        Self::D2Concatenate,
        Self::D2Condition,
        Self::D2Count,
        Self::D2CountIfValue,
        Self::D2CountIfZeroPos,
        Self::D2DaysBetween,
        Self::D2ExtractDataMatrixValue,
        Self::D2Floor,
        Self::D2HasUserRole,
        Self::D2HasValue,
        Self::D2InOrgUnitGroup,
        Self::D2LastEventDate,
        Self::D2Left,
        Self::D2Length,
        Self::D2MaxValue,
        Self::D2MinValue,
        Self::D2MinutesBetween,
        Self::D2Modulus,
        Self::D2MonthsBetween,
        Self::D2Oizp,
        Self::D2Right,
        Self::D2Round,
        Self::D2Split,
        Self::D2Substring,
        Self::D2ValidatePattern,
        Self::D2WeeksBetween,
        Self::D2YearsBetween,
        Self::D2Zing,
        Self::D2Zpvc,
        Self::D2ZScoreHfa,
        Self::D2ZScoreWfa,
        Self::D2ZScoreWfh,
    ];

    /// Look up a function by its source name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// The name as written in expressions
    pub const fn name(&self) -> &'static str {
        match self {
            Self::FirstNonNull => "firstNonNull",
            Self::Greatest => "greatest",
            Self::If => "if",
            Self::IsNotNull => "isNotNull",
            Self::IsNull => "isNull",
            Self::Least => "least",
            Self::Log => "log",
            Self::Log10 => "log10",
            Self::RemoveZeros => "removeZeros",
            Self::Contains => "contains",
            Self::ContainsItems => "containsItems",
            Self::OrgUnitAncestor => "orgUnit.ancestor",
            Self::OrgUnitDataSet => "orgUnit.dataSet",
            Self::OrgUnitGroup => "orgUnit.group",
            Self::OrgUnitProgram => "orgUnit.program",
            Self::Avg => "avg",
            Self::Count => "count",
            Self::Max => "max",
            Self::Median => "median",
            Self::Min => "min",
            Self::PercentileCont => "percentileCont",
            Self::Stddev => "stddev",
            Self::StddevPop => "stddevPop",
            Self::StddevSamp => "stddevSamp",
            Self::Sum => "sum",
            Self::Variance => "variance",
            Self::D2AddDays => "d2:addDays",
            Self::D2Ceil => "d2:ceil",
            Self::D2Concatenate => "d2:concatenate",
            Self::D2Condition => "d2:condition",
            Self::D2Count => "d2:count",
            Self::D2CountIfValue => "d2:countIfValue",
            Self::D2CountIfZeroPos => "d2:countIfZeroPos",
            Self::D2DaysBetween => "d2:daysBetween",
            Self::D2ExtractDataMatrixValue => "d2:extractDataMatrixValue",
            Self::D2Floor => "d2:floor",
            Self::D2HasUserRole => "d2:hasUserRole",
            Self::D2HasValue => "d2:hasValue",
            Self::D2InOrgUnitGroup => "d2:inOrgUnitGroup",
            Self::D2LastEventDate => "d2:lastEventDate",
            Self::D2Left => "d2:left",
            Self::D2Length => "d2:length",
            Self::D2MaxValue => "d2:maxValue",
            Self::D2MinValue => "d2:minValue",
            Self::D2MinutesBetween => "d2:minutesBetween",
            Self::D2Modulus => "d2:modulus",
            Self::D2MonthsBetween => "d2:monthsBetween",
            Self::D2Oizp => "d2:oizp",
            Self::D2Right => "d2:right",
            Self::D2Round => "d2:round",
            Self::D2Split => "d2:split",
            Self::D2Substring => "d2:substring",
            Self::D2ValidatePattern => "d2:validatePattern",
            Self::D2WeeksBetween => "d2:weeksBetween",
            Self::D2YearsBetween => "d2:yearsBetween",
            Self::D2Zing => "d2:zing",
            Self::D2Zpvc => "d2:zpvc",
            Self::D2ZScoreHfa => "d2:zScoreHFA",
            Self::D2ZScoreWfa => "d2:zScoreWFA",
            Self::D2ZScoreWfh => "d2:zScoreWFH",
        }
    }

    pub const fn signature(&self) -> Signature {
        match self {
            Self::FirstNonNull => Signature::varargs(S, &[S]),
            Self::Greatest | Self::Least => Signature::varargs(N, &[N]),
            Self::If => Signature::new(S, &[B, S, S]),
            Self::IsNotNull | Self::IsNull => Signature::new(B, &[M]),
            Self::Log => Signature::new(N, &[N, N]),
            Self::Log10 | Self::RemoveZeros => Signature::new(N, &[N]),
            Self::Contains | Self::ContainsItems => Signature::varargs(B, &[T, T]),

            Self::OrgUnitAncestor
            | Self::OrgUnitDataSet
            | Self::OrgUnitGroup
            | Self::OrgUnitProgram => Signature::varargs(B, &[T]),

            Self::Count => Signature::new(N, &[M]),
            Self::PercentileCont => Signature::new(N, &[N, N]),
            Self::Avg
            | Self::Max
            | Self::Median
            | Self::Min
            | Self::Stddev
            | Self::StddevPop
            | Self::StddevSamp
            | Self::Sum
            | Self::Variance => Signature::new(N, &[N]),

            Self::D2AddDays => Signature::new(D, &[D, N]),
            Self::D2Ceil | Self::D2Floor | Self::D2Oizp | Self::D2Zing => Signature::new(N, &[N]),
            Self::D2Concatenate => Signature::varargs(T, &[T]),
            Self::D2Condition => Signature::new(S, &[B, S, S]),
            Self::D2Count | Self::D2CountIfZeroPos | Self::D2MaxValue | Self::D2MinValue => {
                Signature::new(N, &[M])
            }
            Self::D2CountIfValue => Signature::new(N, &[M, M]),
            Self::D2DaysBetween
            | Self::D2MinutesBetween
            | Self::D2MonthsBetween
            | Self::D2WeeksBetween
            | Self::D2YearsBetween => Signature::new(N, &[D, D]),
            Self::D2ExtractDataMatrixValue => Signature::new(T, &[T, T]),
            Self::D2HasUserRole | Self::D2InOrgUnitGroup => Signature::new(B, &[T]),
            Self::D2HasValue => Signature::new(B, &[M]),
            Self::D2LastEventDate => Signature::new(D, &[M]),
            Self::D2Left | Self::D2Right => Signature::new(T, &[T, N]),
            Self::D2Length => Signature::new(N, &[T]),
            Self::D2Modulus | Self::D2Round => Signature::new(N, &[N, N]),
            Self::D2Split => Signature::new(T, &[T, T, N]),
            Self::D2Substring => Signature::new(T, &[T, N, N]),
            Self::D2ValidatePattern => Signature::new(B, &[T, T]),
            Self::D2Zpvc => Signature::varargs(N, &[N]),
            Self::D2ZScoreHfa | Self::D2ZScoreWfa | Self::D2ZScoreWfh => {
                Signature::new(N, &[N, N, T])
            }
        }
    }

    /// Aggregating functions evaluate their aggregated argument once per
    /// value in the bound series
    pub const fn is_aggregating(&self) -> bool {
        matches!(
            self,
            Self::Avg
                | Self::Count
                | Self::Max
                | Self::Median
                | Self::Min
                | Self::PercentileCont
                | Self::Stddev
                | Self::StddevPop
                | Self::StddevSamp
                | Self::Sum
                | Self::Variance
        )
    }

    /// Index of the argument that is aggregated
    pub const fn aggregated_arg(&self) -> usize {
        match self {
            Self::PercentileCont => 1,
            _ => 0,
        }
    }

    /// Functions whose arguments are evaluated on demand by the evaluator
    pub const fn is_lazy(&self) -> bool {
        matches!(
            self,
            Self::If | Self::IsNull | Self::IsNotNull | Self::FirstNonNull | Self::D2Condition
        )
    }

    /// Functions taking organisation unit identifiers
    pub const fn takes_org_unit_uids(&self) -> bool {
        matches!(
            self,
            Self::OrgUnitAncestor | Self::OrgUnitDataSet | Self::OrgUnitGroup | Self::OrgUnitProgram
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for function in NamedFunction::ALL {
            assert_eq!(NamedFunction::from_name(function.name()), Some(*function));
        }
        assert_eq!(NamedFunction::from_name("d2:nope"), None);
    }

    #[test]
    fn test_varargs_reuse_last_param_type() {
        let sig = NamedFunction::Contains.signature();
        assert_eq!(sig.param_type(0), ValueType::String);
        assert_eq!(sig.param_type(5), ValueType::String);

        let sig = NamedFunction::Log10.signature();
        assert_eq!(sig.param_type(3), ValueType::Mixed);
    }

    #[test]
    fn test_same_groups() {
        assert!(NamedFunction::If.signature().has_same_group());
        assert!(NamedFunction::FirstNonNull.signature().has_same_group());
        assert!(!NamedFunction::Greatest.signature().has_same_group());
    }

    #[test]
    fn test_aggregation_flags() {
        assert!(NamedFunction::Sum.is_aggregating());
        assert!(!NamedFunction::Greatest.is_aggregating());
        assert_eq!(NamedFunction::PercentileCont.aggregated_arg(), 1);
    }
}
