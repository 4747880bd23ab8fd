//! Structural validation of problem definitions.
//!
//! Validation is collect-all: every violation found is reported, not just
//! the first, so a caller can surface them to the user in one pass.

use thiserror::Error;

use crate::models::Problem;

/// A structural defect in a problem definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Two processes share a name; lookups by name would be ambiguous.
    #[error("duplicate process name: {0}")]
    DuplicateProcessName(String),

    /// The problem defines no processes at all.
    #[error("problem has no processes")]
    NoProcesses,

    /// A process declares a negative delay.
    #[error("process {name} has negative delay {delay}")]
    NegativeDelay { name: String, delay: i64 },

    /// A requisite or product quantity is zero or negative.
    #[error("process {name} declares non-positive quantity for {resource}")]
    NonPositiveQuantity { name: String, resource: String },

    /// The optimization target is neither stocked nor produced by any
    /// process.
    #[error("target {0} is neither in stock nor producible")]
    UnknownTarget(String),
}

/// All violations found, or Ok.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Checks a problem's structure.
pub fn validate_problem(problem: &Problem) -> ValidationResult {
    let mut errors = Vec::new();

    if problem.processes.is_empty() {
        errors.push(ValidationError::NoProcesses);
    }

    let mut seen = std::collections::HashSet::new();
    for process in &problem.processes {
        if !seen.insert(process.name.as_str()) {
            errors.push(ValidationError::DuplicateProcessName(process.name.clone()));
        }
        if process.delay < 0 {
            errors.push(ValidationError::NegativeDelay {
                name: process.name.clone(),
                delay: process.delay,
            });
        }
        for (resource, &quantity) in process.requisites.iter().chain(process.produces.iter()) {
            if quantity <= 0 {
                errors.push(ValidationError::NonPositiveQuantity {
                    name: process.name.clone(),
                    resource: resource.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks that a target is reachable: already stocked or produced by at
/// least one process.
pub fn validate_target(problem: &Problem, target: &str) -> ValidationResult {
    let stocked = problem.stocks.available(target) > 0;
    let producible = problem
        .processes
        .iter()
        .any(|p| p.produces_resource(target));
    if stocked || producible {
        Ok(())
    } else {
        Err(vec![ValidationError::UnknownTarget(target.to_string())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Process;

    fn valid_problem() -> Problem {
        Problem::new().with_stock("wood", 4).with_process(
            Process::new("saw")
                .with_requisite("wood", 2)
                .with_product("plank", 1)
                .with_delay(2),
        )
    }

    #[test]
    fn test_valid_problem_passes() {
        assert!(validate_problem(&valid_problem()).is_ok());
    }

    #[test]
    fn test_no_processes() {
        let errors = validate_problem(&Problem::new()).unwrap_err();
        assert_eq!(errors, vec![ValidationError::NoProcesses]);
    }

    #[test]
    fn test_duplicate_names_reported() {
        let problem = valid_problem().with_process(
            Process::new("saw")
                .with_requisite("wood", 1)
                .with_product("sawdust", 1),
        );
        let errors = validate_problem(&problem).unwrap_err();
        assert!(errors.contains(&ValidationError::DuplicateProcessName("saw".into())));
    }

    #[test]
    fn test_collects_every_violation() {
        let problem = Problem::new().with_process(
            Process::new("broken")
                .with_requisite("wood", 0)
                .with_product("plank", -1)
                .with_delay(-3),
        );
        let errors = validate_problem(&problem).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::NegativeDelay {
            name: "broken".into(),
            delay: -3,
        }));
        assert!(errors.contains(&ValidationError::NonPositiveQuantity {
            name: "broken".into(),
            resource: "wood".into(),
        }));
        assert!(errors.contains(&ValidationError::NonPositiveQuantity {
            name: "broken".into(),
            resource: "plank".into(),
        }));
    }

    #[test]
    fn test_target_reachability() {
        let problem = valid_problem();
        assert!(validate_target(&problem, "plank").is_ok());
        assert!(validate_target(&problem, "wood").is_ok());
        assert_eq!(
            validate_target(&problem, "gold").unwrap_err(),
            vec![ValidationError::UnknownTarget("gold".into())]
        );
    }

    #[test]
    fn test_error_display() {
        let error = ValidationError::NegativeDelay {
            name: "saw".into(),
            delay: -2,
        };
        assert_eq!(error.to_string(), "process saw has negative delay -2");
    }
}
