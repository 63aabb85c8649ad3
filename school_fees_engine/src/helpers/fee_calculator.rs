use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::db_types::{Fee, Student};

/// A per-student itemization of the fee schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    /// Fee code (uppercased) to amount. `extra_fees` are folded into the template's line.
    pub fees: BTreeMap<String, f64>,
    pub subtotal: f64,
    pub final_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentFeeDetail {
    pub student_id: String,
    pub student_name: String,
    pub breakdown: FeeBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeCalculation {
    pub total_amount: f64,
    pub student_fees: Vec<StudentFeeDetail>,
}

/// Compute the expected school-fees total for a set of students against the fee schedule.
///
/// Every student receives the full schedule. Club charges are deliberately not part of this figure; they
/// are supplied separately by the payer and validated by the orchestration layer. If a student id appears
/// more than once in `students`, its charges are counted once per occurrence.
pub fn calculate_fees(students: &[Student], schedule: &[Fee]) -> FeeCalculation {
    let mut student_fees = Vec::with_capacity(students.len());
    let mut total_amount = 0.0;
    for student in students {
        let mut fees = BTreeMap::new();
        let mut subtotal = 0.0;
        for fee in schedule {
            let line = fee.amount + fee.extra_fees.unwrap_or(0.0);
            fees.insert(fee.code.to_uppercase(), line);
            subtotal += line;
        }
        total_amount += subtotal;
        student_fees.push(StudentFeeDetail {
            student_id: student.id.clone(),
            student_name: student.full_name(),
            breakdown: FeeBreakdown { fees, subtotal, final_amount: subtotal },
        });
    }
    FeeCalculation { total_amount, student_fees }
}
