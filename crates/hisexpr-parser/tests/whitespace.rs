//! Annotated parsing reproduces the source text

use hisexpr_ast::normalise;
use hisexpr_parser::{ExpressionMode, parse};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case::plain("1 + 2", ExpressionMode::IndicatorExpression)]
#[case::padded("  if( true ,1 , 2 )  ", ExpressionMode::IndicatorExpression)]
#[case::comments("1 /* a */ * (2+3) /* end */", ExpressionMode::IndicatorExpression)]
#[case::multiline("#{FTRrcoaog83}\n  + C{bWEgzTHB7Uv}\n", ExpressionMode::IndicatorExpression)]
#[case::modifier("#{FTRrcoaog83} .periodOffset( -1 )", ExpressionMode::IndicatorExpression)]
#[case::word_operators("not true and  false", ExpressionMode::IndicatorExpression)]
#[case::signs("- -2 ^-1", ExpressionMode::IndicatorExpression)]
#[case::quoted_argument(
    "d2:condition( '#{a} > 1' , 1, 2)",
    ExpressionMode::RuleEngineAction
)]
#[case::org_units(
    "orgUnit.group( 'ImspTQPwCqd',tQC7ymx8DHq )",
    ExpressionMode::ValidationRuleExpression
)]
#[case::aggregate("sum( #{FTRrcoaog83} )/[days]", ExpressionMode::PredictorGeneratorExpression)]
fn test_round_trip(#[case] source: &str, #[case] mode: ExpressionMode) {
    let root = parse(source, mode, true).unwrap();
    assert_eq!(normalise(&root), source);
}

#[test]
fn test_without_annotation_spacing_is_normalised() {
    let root = parse("1+2*  3", ExpressionMode::IndicatorExpression, false).unwrap();
    assert_eq!(normalise(&root), "1 + 2 * 3");
    let root = parse("not( true )", ExpressionMode::IndicatorExpression, false).unwrap();
    assert_eq!(normalise(&root), "not (true)");
}

#[test]
fn test_normalised_text_is_stable() {
    let source = "if(#{FTRrcoaog83}.periodOffset(-1)>0,-1, 2^ -3)";
    let once = normalise(&parse(source, ExpressionMode::IndicatorExpression, false).unwrap());
    let twice = normalise(&parse(&once, ExpressionMode::IndicatorExpression, false).unwrap());
    assert_eq!(once, twice);
}
