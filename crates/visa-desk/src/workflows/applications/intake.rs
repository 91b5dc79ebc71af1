use super::domain::ClientRegistration;

/// Registration payload after normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRegistration {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("client name is required")]
    MissingName,
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
}

pub(crate) fn normalize_registration(
    registration: ClientRegistration,
) -> Result<NormalizedRegistration, RegistrationError> {
    let name = registration.name.trim().to_string();
    if name.is_empty() {
        return Err(RegistrationError::MissingName);
    }

    let email = registration.email.trim().to_ascii_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    };
    if !valid {
        return Err(RegistrationError::InvalidEmail(registration.email));
    }

    Ok(NormalizedRegistration { name, email })
}
