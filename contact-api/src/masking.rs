/// Obscures an email address for log output, keeping the first three characters of the local
/// part and the domain. Local parts shorter than three characters are hidden entirely.
pub fn mask_email(email: &str) -> String {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return "***".into();
    };
    if local.chars().count() < 3 {
        return format!("***@{domain}");
    }
    let prefix: String = local.chars().take(3).collect();
    format!("{prefix}***@{domain}")
}

#[cfg(test)]
mod tests {
    use super::mask_email;
    use googletest::prelude::*;

    #[test]
    fn keeps_first_three_characters_of_longer_local_part() -> Result<()> {
        verify_that!(mask_email("jane.doe@example.com"), eq("jan***@example.com"))
    }

    #[test]
    fn keeps_local_part_of_exactly_three_characters() -> Result<()> {
        verify_that!(mask_email("abc@example.com"), eq("abc***@example.com"))
    }

    #[test]
    fn hides_short_local_part_entirely() -> Result<()> {
        verify_that!(mask_email("ab@example.com"), eq("***@example.com"))
    }

    #[test]
    fn masks_everything_without_at_sign() -> Result<()> {
        verify_that!(mask_email("no-at-sign"), eq("***"))
    }

    #[test]
    fn masks_everything_with_two_at_signs() -> Result<()> {
        verify_that!(mask_email("a@b@example.com"), eq("***"))
    }

    #[test]
    fn counts_characters_rather_than_bytes() -> Result<()> {
        verify_that!(mask_email("jürgen@example.de"), eq("jür***@example.de"))
    }
}
