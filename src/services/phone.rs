//! Phone normalization and display formatting.
//!
//! The form collects a country-code selection plus a free-text national
//! number. The canonical stored value is `"{cc}-{digits}"`; the display
//! grouping exists only for on-screen editing and never changes the
//! canonical value.

/// Canonical form of a phone number: country code, a dash, and the national
/// number reduced to digits. Degrades to the digits alone without a country
/// code, and to the empty string when nothing was entered.
pub fn canonical(country_code: &str, national: &str) -> String {
    let digits = national_digits(national);
    let cc = country_code.trim();

    if cc.is_empty() {
        digits
    } else if digits.is_empty() {
        String::new()
    } else {
        format!("{cc}-{digits}")
    }
}

/// National number reduced to its digits.
pub fn national_digits(national: &str) -> String {
    national.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Display grouping for the national digits: 4-3-3, then the remainder.
/// Purely cosmetic; `national_digits(format_national(d)) == d`.
pub fn format_national(digits: &str) -> String {
    let digits = national_digits(digits);

    let mut groups: Vec<&str> = Vec::new();
    let mut rest = digits.as_str();
    for len in [4usize, 3, 3] {
        if rest.len() <= len {
            break;
        }
        let (head, tail) = rest.split_at(len);
        groups.push(head);
        rest = tail;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }

    groups.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_combines_code_and_digits() {
        assert_eq!(canonical("44", "7398 344-190"), "44-7398344190");
        assert_eq!(canonical("", "7398344190"), "7398344190");
        assert_eq!(canonical("", ""), "");
        assert_eq!(canonical("44", ""), "");
    }

    #[test]
    fn canonical_is_idempotent_on_the_national_field() {
        let once = canonical("44", "7398 344 190");
        let twice = canonical("44", "7398344190");
        assert_eq!(once, twice);

        let bare = canonical("", "(020) 7946-0958");
        assert_eq!(canonical("", &bare), bare);
    }

    #[test]
    fn display_grouping_is_4_3_3_remainder() {
        assert_eq!(format_national("7398344190"), "7398 344 190");
        assert_eq!(format_national("73983441901"), "7398 344 190 1");
        assert_eq!(format_national("7398"), "7398");
        assert_eq!(format_national(""), "");
    }

    #[test]
    fn display_form_round_trips_through_normalization() {
        let digits = "7398344190";
        let shown = format_national(digits);
        assert_eq!(national_digits(&shown), digits);
        assert_eq!(canonical("44", &shown), canonical("44", digits));
    }
}
