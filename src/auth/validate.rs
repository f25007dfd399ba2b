use lazy_static::lazy_static;
use regex::Regex;

use crate::auth::dto::SignupRequest;
use crate::error::FieldError;
use crate::users::model::{Role, RoleDetails};

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").unwrap();
    static ref USERNAME_RE: Regex = Regex::new(r"^[a-zA-Z0-9@._-]+$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^[0-9]{10}$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Check every signup constraint and report all violations at once. On
/// success the role and its conditional identifier come back as a variant
/// that cannot be mismatched.
pub fn validate_signup(req: &SignupRequest) -> Result<RoleDetails, Vec<FieldError>> {
    let mut errors = Vec::new();

    if req.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }

    let username = req.username.trim();
    if username.is_empty() {
        errors.push(FieldError::new("username", "Username is required"));
    } else if username.len() < 3 {
        errors.push(FieldError::new(
            "username",
            "Username must be at least 3 characters long",
        ));
    } else if !USERNAME_RE.is_match(username) {
        errors.push(FieldError::new(
            "username",
            "Username can only contain letters, numbers, @, dots, underscores, and hyphens",
        ));
    }

    if !is_valid_email(req.email.trim()) {
        errors.push(FieldError::new("email", "Please enter a valid email"));
    }

    if req.password.len() < 6 {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 6 characters long",
        ));
    }

    if !PHONE_RE.is_match(req.phone.trim()) {
        errors.push(FieldError::new("phone", "Phone number must be 10 digits"));
    }

    let details = match req.role.trim().parse::<Role>() {
        Err(_) => {
            errors.push(FieldError::new("role", "Invalid role"));
            None
        }
        Ok(Role::Admin) => Some(RoleDetails::Admin),
        Ok(Role::Student) => match present(&req.roll_number) {
            Some(roll_number) => Some(RoleDetails::Student {
                roll_number: roll_number.to_string(),
            }),
            None => {
                errors.push(FieldError::new(
                    "rollNumber",
                    "Roll number is required for students",
                ));
                None
            }
        },
        Ok(Role::Teacher) => match present(&req.teacher_id) {
            Some(teacher_id) => Some(RoleDetails::Teacher {
                teacher_id: teacher_id.to_string(),
            }),
            None => {
                errors.push(FieldError::new(
                    "teacherId",
                    "Teacher ID is required for teachers",
                ));
                None
            }
        },
    };

    match (details, errors.is_empty()) {
        (Some(details), true) => Ok(details),
        (_, _) => Err(errors),
    }
}
