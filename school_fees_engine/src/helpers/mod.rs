//! Pure calculation helpers. Nothing in this module touches the database or the network.

mod fee_calculator;
mod split;

pub use fee_calculator::{calculate_fees, FeeBreakdown, FeeCalculation, StudentFeeDetail};
pub use split::{
    exam_fees_split,
    route_exam_account,
    school_fees_split,
    CallbackConfig,
    ExamShareLine,
    FlowConfig,
    SubaccountConfig,
    AMOUNT_TOLERANCE,
};
