use std::fmt;

use thiserror::Error;

use super::dto::{QuestionnaireAnswers, QuestionnaireSubmission};
use crate::auth::services::validate_registration;

pub const HEIGHT_CM: (f64, f64) = (140.0, 220.0);
pub const WEIGHT_KG: (f64, f64) = (40.0, 150.0);

/// Questionnaire steps in the order they are answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    Welcome,
    Gender,
    Biometrics,
    Goals,
    Experience,
    SupplementCount,
    Preferences,
    FitnessGoals,
    Dietary,
    Registration,
}

impl Step {
    pub const ALL: [Step; 10] = [
        Step::Welcome,
        Step::Gender,
        Step::Biometrics,
        Step::Goals,
        Step::Experience,
        Step::SupplementCount,
        Step::Preferences,
        Step::FitnessGoals,
        Step::Dietary,
        Step::Registration,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Step::Welcome => "welcome",
            Step::Gender => "gender",
            Step::Biometrics => "biometrics",
            Step::Goals => "goals",
            Step::Experience => "experience",
            Step::SupplementCount => "supplement-count",
            Step::Preferences => "preferences",
            Step::FitnessGoals => "fitness-goals",
            Step::Dietary => "dietary",
            Step::Registration => "registration",
        }
    }

    /// Only the answers this step asks for. Account details are checked by `validate`.
    fn check(self, a: &QuestionnaireAnswers) -> Result<(), &'static str> {
        match self {
            Step::Welcome
            | Step::Preferences
            | Step::FitnessGoals
            | Step::Dietary
            | Step::Registration => Ok(()),
            Step::Gender => match a.gender.as_str() {
                "male" | "female" => Ok(()),
                _ => Err("gender must be male or female"),
            },
            Step::Biometrics => {
                if !in_range(a.height, HEIGHT_CM) {
                    Err("height must be between 140 and 220 cm")
                } else if !in_range(a.weight, WEIGHT_KG) {
                    Err("weight must be between 40 and 150 kg")
                } else {
                    Ok(())
                }
            }
            Step::Goals => non_empty(&a.goal, "pick a goal"),
            Step::Experience => non_empty(&a.experience, "pick your experience"),
            Step::SupplementCount => non_empty(&a.supplement_count, "pick a supplement count"),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{step}: {reason}")]
pub struct StepError {
    pub step: Step,
    pub reason: &'static str,
}

fn in_range(v: f64, (lo, hi): (f64, f64)) -> bool {
    v.is_finite() && v >= lo && v <= hi
}

fn non_empty(v: &str, reason: &'static str) -> Result<(), &'static str> {
    if v.trim().is_empty() {
        Err(reason)
    } else {
        Ok(())
    }
}

/// Walks the answer steps in order and stops at the first one that fails.
pub fn validate_answers(a: &QuestionnaireAnswers) -> Result<(), StepError> {
    for step in Step::ALL {
        step.check(a).map_err(|reason| StepError { step, reason })?;
    }
    Ok(())
}

/// Full submission: every answer step, then registration.
pub fn validate(s: &QuestionnaireSubmission) -> Result<(), StepError> {
    validate_answers(&s.answers)?;
    validate_registration(&s.email, &s.password, &s.name).map_err(|reason| StepError {
        step: Step::Registration,
        reason,
    })
}

/// Current supplements without repeats, first occurrence wins.
pub fn unique_supplements(ids: &[i64]) -> Vec<i64> {
    let mut out: Vec<i64> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers() -> QuestionnaireAnswers {
        QuestionnaireAnswers {
            gender: "female".into(),
            height: 168.0,
            weight: 61.5,
            goal: "muscle".into(),
            experience: "beginner".into(),
            supplement_count: "1-3".into(),
            selection_preferences: vec!["price".into()],
            fitness_goals: vec![],
            dietary_preferences: vec!["vegan".into()],
        }
    }

    fn valid() -> QuestionnaireSubmission {
        QuestionnaireSubmission {
            answers: answers(),
            current_supplements: vec![3, 1, 3],
            email: "eva@example.com".into(),
            password: "longenough".into(),
            name: "Eva".into(),
        }
    }

    #[test]
    fn accepts_complete_submission() {
        assert_eq!(validate(&valid()), Ok(()));
    }

    #[test]
    fn reports_first_failing_step() {
        let mut s = valid();
        s.answers.gender = "other".into();
        s.answers.height = 20.0;
        s.email = "broken".into();
        let err = validate(&s).unwrap_err();
        assert_eq!(err.step, Step::Gender);

        s.answers.gender = "male".into();
        assert_eq!(validate(&s).unwrap_err().step, Step::Biometrics);

        s.answers.height = 180.0;
        assert_eq!(validate(&s).unwrap_err().step, Step::Registration);
    }

    #[test]
    fn biometric_bounds_follow_the_sliders() {
        let mut a = answers();
        a.height = 220.0;
        a.weight = 40.0;
        assert!(validate_answers(&a).is_ok());
        a.height = 140.0;
        a.weight = 150.0;
        assert!(validate_answers(&a).is_ok());

        a.height = 139.0;
        assert_eq!(validate_answers(&a).unwrap_err().step, Step::Biometrics);
        a.height = 221.0;
        assert_eq!(validate_answers(&a).unwrap_err().step, Step::Biometrics);

        a.height = 180.0;
        a.weight = 151.0;
        assert_eq!(validate_answers(&a).unwrap_err().step, Step::Biometrics);
        a.weight = f64::NAN;
        let err = validate_answers(&a).unwrap_err();
        assert!(err.to_string().starts_with("biometrics: weight"));
    }

    #[test]
    fn blank_answers_fail_their_step() {
        let mut a = answers();
        a.experience = "  ".into();
        assert_eq!(validate_answers(&a).unwrap_err().step, Step::Experience);

        let mut a = answers();
        a.supplement_count.clear();
        assert_eq!(validate_answers(&a).unwrap_err().step, Step::SupplementCount);
    }

    #[test]
    fn answers_alone_skip_account_checks() {
        assert_eq!(validate_answers(&answers()), Ok(()));
    }

    #[test]
    fn submission_json_is_flat() {
        let s: QuestionnaireSubmission = serde_json::from_value(serde_json::json!({
            "gender": "male",
            "height": 182,
            "weight": 80.5,
            "goal": "strength",
            "experience": "advanced",
            "supplement_count": "4+",
            "fitness_goals": ["power"],
            "current_supplements": [7],
            "email": "a@b.cz",
            "password": "longenough",
            "name": "Adam"
        }))
        .unwrap();
        assert_eq!(s.answers.height, 182.0);
        assert!(s.answers.dietary_preferences.is_empty());
        assert_eq!(s.current_supplements, vec![7]);
        assert_eq!(validate(&s), Ok(()));
    }

    #[test]
    fn steps_are_ordered() {
        assert!(Step::ALL.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(Step::ALL[0], Step::Welcome);
        assert_eq!(Step::ALL[9], Step::Registration);
    }

    #[test]
    fn supplements_are_deduplicated_in_order() {
        assert_eq!(unique_supplements(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(unique_supplements(&[]).is_empty());
    }
}
