use crate::model::{to_fixed_2, Assignment, Class, LetterGrade, WeightCategory};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassGradeResult {
    pub final_score_percent: String,
    pub letter_grade: String,
    pub gpa_points: f64,
}

impl ClassGradeResult {
    pub fn not_available() -> Self {
        Self {
            final_score_percent: NOT_AVAILABLE.to_string(),
            letter_grade: NOT_AVAILABLE.to_string(),
            gpa_points: 0.0,
        }
    }

    fn from_percent(percent: f64) -> Self {
        let grade = LetterGrade::from_percent(percent);
        Self {
            final_score_percent: to_fixed_2(percent),
            letter_grade: grade.as_str().to_string(),
            gpa_points: grade.points(),
        }
    }
}

/// Published output of one aggregation pass. Replaced wholesale on every
/// recomputation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeReport {
    pub overall_gpa: String,
    pub per_class: BTreeMap<String, ClassGradeResult>,
}

impl Default for GradeReport {
    fn default() -> Self {
        Self {
            overall_gpa: NOT_AVAILABLE.to_string(),
            per_class: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GradeSource {
    Assignments,
    ManualGrade,
    NoGrade,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub category: &'static str,
    pub weight: f64,
    pub assignment_count: usize,
    pub scored_count: usize,
    pub scored_assignment_ids: Vec<String>,
    pub sum_score: f64,
    pub sum_max_score: f64,
    pub average: Option<f64>,
    pub contributed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassBreakdown {
    pub class_id: String,
    pub is_current_schedule: bool,
    pub categories: Vec<CategoryBreakdown>,
    pub weighted_sum: f64,
    pub weight_provided: f64,
    pub source: GradeSource,
    pub result: ClassGradeResult,
}

#[derive(Debug, Clone)]
struct ClassPercent {
    percent: f64,
    source: GradeSource,
    weighted_sum: f64,
    weight_provided: f64,
    categories: Vec<CategoryBreakdown>,
}

fn valid_credit_hours(class: &Class) -> Option<f64> {
    class.credit_hours.filter(|h| *h > 0.0)
}

fn class_percent(class: &Class, assignments: &[&Assignment]) -> ClassPercent {
    let mut buckets: [Vec<&Assignment>; 4] = Default::default();
    for &a in assignments {
        if let Some(category) = a.weightage_type {
            buckets[category.index()].push(a);
        }
    }

    let mut weighted_sum = 0.0_f64;
    let mut weight_provided = 0.0_f64;
    let mut categories = Vec::with_capacity(WeightCategory::ALL.len());

    for category in WeightCategory::ALL {
        let weight = class.weight(category) / 100.0;
        let bucket = &buckets[category.index()];

        let mut sum_score = 0.0_f64;
        let mut sum_max_score = 0.0_f64;
        let mut scored_ids: Vec<String> = Vec::new();
        if weight > 0.0 && !bucket.is_empty() {
            for a in bucket {
                // Non-conforming entries are skipped, not counted as zero.
                let Some((score, max)) = a.scored() else {
                    continue;
                };
                sum_score += score;
                sum_max_score += max;
                scored_ids.push(a.id.clone());
            }
        }

        // Extra credit can push the average above 1.0; it is not clamped.
        let scored_count = scored_ids.len();
        let average = (scored_count > 0).then(|| sum_score / sum_max_score);
        if let Some(avg) = average {
            weighted_sum += avg * weight;
            weight_provided += weight;
        }

        categories.push(CategoryBreakdown {
            category: category.as_str(),
            weight,
            assignment_count: bucket.len(),
            scored_count,
            scored_assignment_ids: scored_ids,
            sum_score,
            sum_max_score,
            average,
            contributed: average.is_some(),
        });
    }

    let (percent, source) = if weight_provided > 0.0 {
        // Renormalized by the weight actually exercised, so ungraded
        // categories do not count against the class.
        ((weighted_sum / weight_provided) * 100.0, GradeSource::Assignments)
    } else {
        match class.manual_grade.as_deref().and_then(LetterGrade::parse) {
            Some(grade) => (grade.fallback_percent(), GradeSource::ManualGrade),
            None => (0.0, GradeSource::NoGrade),
        }
    };

    ClassPercent {
        percent,
        source,
        weighted_sum,
        weight_provided,
        categories,
    }
}

fn assignments_by_class(assignments: &[Assignment]) -> HashMap<&str, Vec<&Assignment>> {
    let mut by_class: HashMap<&str, Vec<&Assignment>> = HashMap::new();
    for a in assignments {
        by_class.entry(a.class_id.as_str()).or_default().push(a);
    }
    by_class
}

/// Computes per-class results and the credit-weighted GPA over the current
/// schedule. Pure: the same inputs always give the same report.
pub fn compute_grades(classes: &[Class], assignments: &[Assignment]) -> GradeReport {
    let by_class = assignments_by_class(assignments);

    let mut per_class: BTreeMap<String, ClassGradeResult> = BTreeMap::new();
    let mut total_grade_points = 0.0_f64;
    let mut total_credit_hours = 0.0_f64;

    for class in classes.iter().filter(|c| c.is_current_schedule) {
        let Some(credit_hours) = valid_credit_hours(class) else {
            per_class.insert(class.id.clone(), ClassGradeResult::not_available());
            continue;
        };

        let own = by_class
            .get(class.id.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let result = ClassGradeResult::from_percent(class_percent(class, own).percent);

        total_grade_points += result.gpa_points * credit_hours;
        total_credit_hours += credit_hours;
        per_class.insert(class.id.clone(), result);
    }

    let overall_gpa = if total_credit_hours > 0.0 {
        to_fixed_2(total_grade_points / total_credit_hours)
    } else {
        NOT_AVAILABLE.to_string()
    };

    GradeReport {
        overall_gpa,
        per_class,
    }
}

/// Per-category detail for one class, whether or not it is on the current
/// schedule. The embedded result matches what `compute_grades` reports for
/// the class when it is scheduled.
pub fn class_breakdown(class: &Class, assignments: &[Assignment]) -> ClassBreakdown {
    let own: Vec<&Assignment> = assignments
        .iter()
        .filter(|a| a.class_id == class.id)
        .collect();
    let detail = class_percent(class, &own);
    let result = if valid_credit_hours(class).is_some() {
        ClassGradeResult::from_percent(detail.percent)
    } else {
        ClassGradeResult::not_available()
    };

    ClassBreakdown {
        class_id: class.id.clone(),
        is_current_schedule: class.is_current_schedule,
        categories: detail.categories,
        weighted_sum: detail.weighted_sum,
        weight_provided: detail.weight_provided,
        source: detail.source,
        result,
    }
}
