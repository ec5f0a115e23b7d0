use aeos_database::{Pet, PetRepository};
use sqlx::SqlitePool;

use super::error::ServiceError;

pub const MISSING_NAMES_MESSAGE: &str = "Pet and owner names required";

/// Both names must be present and non-blank.
pub fn validate_names<'a>(
    pet_name: Option<&'a str>,
    owner_name: Option<&'a str>,
) -> Option<(&'a str, &'a str)> {
    let pet_name = pet_name.map(str::trim).filter(|name| !name.is_empty())?;
    let owner_name = owner_name.map(str::trim).filter(|name| !name.is_empty())?;
    Some((pet_name, owner_name))
}

pub async fn add_pet(pool: &SqlitePool, pet_name: &str, owner_name: &str) -> Result<Pet, ServiceError> {
    let pet = PetRepository::new(pool.clone())
        .insert(pet_name, owner_name)
        .await?;
    Ok(pet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_requires_both_names() {
        assert_eq!(validate_names(Some("Rex"), Some("Ana")), Some(("Rex", "Ana")));
        assert_eq!(validate_names(Some("Rex"), None), None);
        assert_eq!(validate_names(None, Some("Ana")), None);
        assert_eq!(validate_names(Some("  "), Some("Ana")), None);
    }
}
