use serde_json::{Map, Value};

/// Letter grades on the 13-step scale, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterGrade {
    APlus,
    A,
    AMinus,
    BPlus,
    B,
    BMinus,
    CPlus,
    C,
    CMinus,
    DPlus,
    D,
    DMinus,
    F,
}

impl LetterGrade {
    pub const ALL: [LetterGrade; 13] = [
        LetterGrade::APlus,
        LetterGrade::A,
        LetterGrade::AMinus,
        LetterGrade::BPlus,
        LetterGrade::B,
        LetterGrade::BMinus,
        LetterGrade::CPlus,
        LetterGrade::C,
        LetterGrade::CMinus,
        LetterGrade::DPlus,
        LetterGrade::D,
        LetterGrade::DMinus,
        LetterGrade::F,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::AMinus => "A-",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::BMinus => "B-",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::CMinus => "C-",
            Self::DPlus => "D+",
            Self::D => "D",
            Self::DMinus => "D-",
            Self::F => "F",
        }
    }

    /// Exact, case-sensitive match against the scale labels.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_str() == s)
    }

    pub fn points(self) -> f64 {
        match self {
            Self::APlus | Self::A => 4.0,
            Self::AMinus => 3.67,
            Self::BPlus => 3.33,
            Self::B => 3.0,
            Self::BMinus => 2.67,
            Self::CPlus => 2.33,
            Self::C => 2.0,
            Self::CMinus => 1.67,
            Self::DPlus => 1.33,
            Self::D => 1.0,
            Self::DMinus => 0.67,
            Self::F => 0.0,
        }
    }

    /// Inclusive lower bound of the percentage band. F is the catch-all.
    pub fn min_percent(self) -> Option<f64> {
        match self {
            Self::APlus => Some(97.0),
            Self::A => Some(93.0),
            Self::AMinus => Some(90.0),
            Self::BPlus => Some(87.0),
            Self::B => Some(83.0),
            Self::BMinus => Some(80.0),
            Self::CPlus => Some(77.0),
            Self::C => Some(73.0),
            Self::CMinus => Some(70.0),
            Self::DPlus => Some(67.0),
            Self::D => Some(63.0),
            Self::DMinus => Some(60.0),
            Self::F => None,
        }
    }

    /// Percentage shown for a class graded only by its manually entered letter.
    pub fn fallback_percent(self) -> f64 {
        match self {
            Self::APlus | Self::A => 95.0,
            Self::AMinus => 91.0,
            Self::BPlus => 88.0,
            Self::B => 85.0,
            Self::BMinus => 81.0,
            Self::CPlus => 78.0,
            Self::C => 75.0,
            Self::CMinus => 71.0,
            Self::DPlus => 68.0,
            Self::D => 65.0,
            Self::DMinus => 61.0,
            Self::F => 50.0,
        }
    }

    /// Bands are checked top-down; the first inclusive lower bound that
    /// `percent` reaches wins. NaN falls through to F.
    pub fn from_percent(percent: f64) -> Self {
        Self::ALL
            .into_iter()
            .find(|g| g.min_percent().map(|min| percent >= min).unwrap_or(false))
            .unwrap_or(Self::F)
    }
}

/// Assignment weightage categories, in the order they are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeightCategory {
    Major,
    Minor,
    Quiz,
    Homework,
}

impl WeightCategory {
    pub const ALL: [WeightCategory; 4] = [
        WeightCategory::Major,
        WeightCategory::Minor,
        WeightCategory::Quiz,
        WeightCategory::Homework,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Major => "Major",
            Self::Minor => "Minor",
            Self::Quiz => "Quiz",
            Self::Homework => "Homework",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }

    /// Class record field holding this category's percentage weight.
    pub fn weight_field(self) -> &'static str {
        match self {
            Self::Major => "majorWeight",
            Self::Minor => "minorWeight",
            Self::Quiz => "quizWeight",
            Self::Homework => "homeworkWeight",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Major => 0,
            Self::Minor => 1,
            Self::Quiz => 2,
            Self::Homework => 3,
        }
    }
}

/// Typed view of a class record, as the grade engine reads it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Class {
    pub id: String,
    pub credit_hours: Option<f64>,
    pub manual_grade: Option<String>,
    /// Percentages indexed by `WeightCategory::index`, 0 when absent.
    pub weights: [f64; 4],
    pub is_current_schedule: bool,
}

impl Class {
    pub fn from_record(record: &Map<String, Value>) -> Self {
        let mut weights = [0.0; 4];
        for category in WeightCategory::ALL {
            weights[category.index()] = record
                .get(category.weight_field())
                .and_then(lenient_f64)
                .unwrap_or(0.0);
        }
        let manual_grade = ["grade", "manualGrade"]
            .into_iter()
            .filter_map(|field| record.get(field).and_then(Value::as_str))
            .find(|g| !g.is_empty())
            .map(str::to_string);

        Self {
            id: record_id(record),
            credit_hours: record.get("creditHours").and_then(lenient_f64),
            manual_grade,
            weights,
            is_current_schedule: record
                .get("isCurrentSchedule")
                .map(checkbox_value)
                .unwrap_or(false),
        }
    }

    pub fn weight(&self, category: WeightCategory) -> f64 {
        self.weights[category.index()]
    }
}

/// Typed view of an assignment record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignment {
    pub id: String,
    pub class_id: String,
    pub score: Option<f64>,
    pub max_score: Option<f64>,
    pub weightage_type: Option<WeightCategory>,
}

impl Assignment {
    pub fn from_record(record: &Map<String, Value>) -> Self {
        Self {
            id: record_id(record),
            class_id: record.get("classId").map(id_text).unwrap_or_default(),
            score: record.get("score").and_then(lenient_f64),
            max_score: record.get("maxScore").and_then(lenient_f64),
            weightage_type: record
                .get("weightageType")
                .and_then(|v| v.as_str())
                .and_then(WeightCategory::parse),
        }
    }

    /// Both numbers present and a positive maximum.
    pub fn scored(&self) -> Option<(f64, f64)> {
        match (self.score, self.max_score) {
            (Some(score), Some(max)) if max > 0.0 => Some((score, max)),
            _ => None,
        }
    }
}

fn record_id(record: &Map<String, Value>) -> String {
    record.get("id").map(id_text).unwrap_or_default()
}

/// Identity rule shared by the engine and the store: strings as-is, other
/// scalars by their JSON text, so `7` and `"7"` name the same record.
pub fn id_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Checkbox semantics: `true` or the submitted value `"on"`.
pub fn checkbox_value(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::String(s) => s == "on",
        _ => false,
    }
}

/// Reads a JSON number, or the leading decimal portion of a string.
/// Non-finite results count as non-numeric.
pub fn lenient_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64().filter(|x| x.is_finite()),
        Value::String(s) => parse_float_prefix(s),
        _ => None,
    }
}

pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let t = s.trim_start();
    let b = t.as_bytes();
    let mut i = 0;
    if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
        i += 1;
    }
    let int_start = i;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < b.len() && b[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        digits += j - frac_start;
        i = j;
    }
    if digits == 0 {
        return None;
    }
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        let mut j = i + 1;
        if j < b.len() && (b[j] == b'+' || b[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    t[..i].parse::<f64>().ok().filter(|x| x.is_finite())
}

/// Two-fraction-digit formatting that rounds ties away from zero on the
/// exact binary value. `format!("{:.2}")` rounds ties to even instead.
/// Non-finite values and magnitudes from 1e21 up print the way JavaScript
/// numbers do, since `toFixed` falls back to that form there.
pub fn to_fixed_2(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if x.abs() >= 1e21 {
        return format!("{x:e}").replacen('e', "e+", 1);
    }
    let exact = format!("{:.40}", x.abs());
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let frac = format!("{frac_part:0<3}");
    let frac = frac.as_bytes();

    let mut digits: Vec<u8> = int_part.bytes().chain(frac[..2].iter().copied()).collect();
    if frac[2] >= b'5' {
        let mut k = digits.len();
        loop {
            if k == 0 {
                digits.insert(0, b'1');
                break;
            }
            k -= 1;
            if digits[k] == b'9' {
                digits[k] = b'0';
            } else {
                digits[k] += 1;
                break;
            }
        }
    }

    let text: String = digits.iter().map(|&d| d as char).collect();
    let split = text.len() - 2;
    let sign = if x < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, &text[..split], &text[split..])
}

/// Input coercion the forms apply before a record is stored.
pub fn normalize_class_fields(data: &mut Map<String, Value>) {
    for category in WeightCategory::ALL {
        let field = category.weight_field();
        if let Some(v) = data.get(field) {
            let n = lenient_f64(v).unwrap_or(0.0);
            data.insert(field.to_string(), number_value(n));
        }
    }
    if let Some(v) = data.get("isCurrentSchedule") {
        let flag = checkbox_value(v);
        data.insert("isCurrentSchedule".to_string(), Value::Bool(flag));
    }
}

pub fn normalize_assignment_fields(data: &mut Map<String, Value>) {
    for field in ["score", "maxScore"] {
        if let Some(v) = data.get(field) {
            let n = lenient_f64(v).map(number_value).unwrap_or(Value::Null);
            data.insert(field.to_string(), n);
        }
    }
}

fn number_value(n: f64) -> Value {
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().expect("object")
    }

    #[test]
    fn bands_are_inclusive_on_lower_bound() {
        assert_eq!(LetterGrade::from_percent(97.0), LetterGrade::APlus);
        assert_eq!(LetterGrade::from_percent(96.999_999), LetterGrade::A);
        assert_eq!(LetterGrade::from_percent(90.0), LetterGrade::AMinus);
        assert_eq!(LetterGrade::from_percent(83.0), LetterGrade::B);
        assert_eq!(LetterGrade::from_percent(60.0), LetterGrade::DMinus);
        assert_eq!(LetterGrade::from_percent(59.99), LetterGrade::F);
        assert_eq!(LetterGrade::from_percent(0.0), LetterGrade::F);
        assert_eq!(LetterGrade::from_percent(f64::NAN), LetterGrade::F);
        assert_eq!(LetterGrade::from_percent(140.0), LetterGrade::APlus);
    }

    #[test]
    fn scale_labels_parse_exactly() {
        for g in LetterGrade::ALL {
            assert_eq!(LetterGrade::parse(g.as_str()), Some(g));
        }
        assert_eq!(LetterGrade::parse("a"), None);
        assert_eq!(LetterGrade::parse(" B"), None);
        assert_eq!(LetterGrade::parse(""), None);
    }

    #[test]
    fn fallback_midpoints_land_in_their_own_band() {
        for g in LetterGrade::ALL {
            let banded = LetterGrade::from_percent(g.fallback_percent());
            assert_eq!(banded.points(), g.points(), "{}", g.as_str());
        }
    }

    #[test]
    fn parse_float_prefix_follows_leading_number() {
        assert_eq!(parse_float_prefix("3"), Some(3.0));
        assert_eq!(parse_float_prefix("  3.5 credits"), Some(3.5));
        assert_eq!(parse_float_prefix("-2"), Some(-2.0));
        assert_eq!(parse_float_prefix(".5"), Some(0.5));
        assert_eq!(parse_float_prefix("1e2x"), Some(100.0));
        assert_eq!(parse_float_prefix("1e"), Some(1.0));
        assert_eq!(parse_float_prefix(""), None);
        assert_eq!(parse_float_prefix("abc"), None);
        assert_eq!(parse_float_prefix("."), None);
    }

    #[test]
    fn to_fixed_rounds_ties_up() {
        assert_eq!(to_fixed_2(90.0), "90.00");
        assert_eq!(to_fixed_2(24.0 / 7.0), "3.43");
        assert_eq!(to_fixed_2(0.125), "0.13");
        assert_eq!(to_fixed_2(2.675), "2.67");
        assert_eq!(to_fixed_2(99.875), "99.88");
        assert_eq!(to_fixed_2(9.999), "10.00");
        assert_eq!(to_fixed_2(0.0), "0.00");
        assert_eq!(to_fixed_2(-0.5), "-0.50");
    }

    #[test]
    fn to_fixed_prints_huge_and_non_finite_like_javascript() {
        assert_eq!(to_fixed_2(f64::INFINITY), "Infinity");
        assert_eq!(to_fixed_2(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(to_fixed_2(f64::NAN), "NaN");
        assert_eq!(to_fixed_2(1e21), "1e+21");
        assert_eq!(to_fixed_2(-1.5e300), "-1.5e+300");
        assert_eq!(to_fixed_2(1e300 / 1e-300), "Infinity");
        assert_eq!(to_fixed_2(999_999_999_999_999_900_000.0), "999999999999999868928.00");
    }

    #[test]
    fn blank_grade_field_does_not_hide_manual_grade_alias() {
        for grade in [json!(null), json!(""), json!(7)] {
            let c = Class::from_record(&obj(json!({ "id": "c", "grade": grade, "manualGrade": "A-" })));
            assert_eq!(c.manual_grade.as_deref(), Some("A-"));
        }
        let c = Class::from_record(&obj(json!({ "id": "c", "grade": "B", "manualGrade": "A-" })));
        assert_eq!(c.manual_grade.as_deref(), Some("B"));
        let c = Class::from_record(&obj(json!({ "id": "c", "grade": "" })));
        assert_eq!(c.manual_grade, None);
    }

    #[test]
    fn checkbox_accepts_only_true_and_on() {
        assert!(checkbox_value(&json!(true)));
        assert!(checkbox_value(&json!("on")));
        assert!(!checkbox_value(&json!("true")));
        assert!(!checkbox_value(&json!(false)));
        assert!(!checkbox_value(&json!("off")));
        assert!(!checkbox_value(&json!(1)));
        assert!(!checkbox_value(&Value::Null));
    }

    #[test]
    fn numeric_and_string_ids_share_one_identity() {
        assert_eq!(id_text(&json!(7)), "7");
        assert_eq!(id_text(&json!("7")), "7");
        assert_eq!(id_text(&Value::Null), "");
        let a = Assignment::from_record(&obj(json!({ "id": 3, "classId": 7 })));
        assert_eq!(a.class_id, "7");
    }

    #[test]
    fn class_from_record_reads_form_values() {
        let c = Class::from_record(&obj(json!({
            "id": "c1",
            "creditHours": "3",
            "grade": "B+",
            "majorWeight": 40,
            "quizWeight": "10",
            "isCurrentSchedule": "on"
        })));
        assert_eq!(c.id, "c1");
        assert_eq!(c.credit_hours, Some(3.0));
        assert_eq!(c.manual_grade.as_deref(), Some("B+"));
        assert_eq!(c.weight(WeightCategory::Major), 40.0);
        assert_eq!(c.weight(WeightCategory::Minor), 0.0);
        assert_eq!(c.weight(WeightCategory::Quiz), 10.0);
        assert!(c.is_current_schedule);

        let alias = Class::from_record(&obj(json!({ "id": 7, "manualGrade": "A" })));
        assert_eq!(alias.id, "7");
        assert_eq!(alias.manual_grade.as_deref(), Some("A"));
        assert!(!alias.is_current_schedule);
    }

    #[test]
    fn assignment_scored_requires_positive_max() {
        let a = Assignment::from_record(&obj(json!({
            "classId": "c1", "score": 5, "maxScore": 0, "weightageType": "Quiz"
        })));
        assert_eq!(a.weightage_type, Some(WeightCategory::Quiz));
        assert_eq!(a.scored(), None);

        let b = Assignment::from_record(&obj(json!({
            "classId": "c1", "score": null, "maxScore": 10, "weightageType": "quiz"
        })));
        assert_eq!(b.weightage_type, None);
        assert_eq!(b.scored(), None);
    }

    #[test]
    fn normalize_coerces_form_fields() {
        let mut class = obj(json!({ "majorWeight": "50", "minorWeight": "", "isCurrentSchedule": "off" }));
        normalize_class_fields(&mut class);
        assert_eq!(class["majorWeight"], json!(50.0));
        assert_eq!(class["minorWeight"], json!(0.0));
        assert_eq!(class["isCurrentSchedule"], json!(false));
        assert!(!class.contains_key("quizWeight"));

        let mut assignment = obj(json!({ "score": "9.5", "maxScore": "n/a" }));
        normalize_assignment_fields(&mut assignment);
        assert_eq!(assignment["score"], json!(9.5));
        assert_eq!(assignment["maxScore"], Value::Null);
    }
}
