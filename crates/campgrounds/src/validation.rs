use std::collections::HashMap;

use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

/// Raw campground fields as submitted by the form, before any type checks
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CampgroundPayload {
    /// `campground[title]`
    pub title: Option<String>,
    /// `campground[price]`
    pub price: Option<String>,
    /// `campground[location]`
    pub location: Option<String>,
    /// `campground[description]`
    pub description: Option<String>,
}

/// Raw review fields as submitted by the form, before any type checks
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewPayload {
    /// `review[rating]`
    pub rating: Option<String>,
    /// `review[body]`
    pub body: Option<String>,
}

/// Validated campground fields
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct CampgroundInput {
    /// Title shown in listings
    #[validate(
        length(min = 1, message = "\"campground.title\" is not allowed to be empty"),
        custom(function = "reject_html", message = "\"campground.title\" must not include HTML!")
    )]
    pub title: String,

    /// Price per night
    #[validate(range(
        min = 0.0,
        message = "\"campground.price\" must be greater than or equal to 0"
    ))]
    pub price: f64,

    /// Free-text location
    #[validate(
        length(min = 1, message = "\"campground.location\" is not allowed to be empty"),
        custom(function = "reject_html", message = "\"campground.location\" must not include HTML!")
    )]
    pub location: String,

    /// Free-text description
    #[validate(
        length(min = 1, message = "\"campground.description\" is not allowed to be empty"),
        custom(
            function = "reject_html",
            message = "\"campground.description\" must not include HTML!"
        )
    )]
    pub description: String,
}

/// Validated review fields
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ReviewInput {
    /// Rating between 1 and 5
    #[validate(range(min = 1, max = 5, message = "\"review.rating\" must be between 1 and 5"))]
    pub rating: i32,

    /// Review text
    #[validate(
        length(min = 1, message = "\"review.body\" is not allowed to be empty"),
        custom(function = "reject_html", message = "\"review.body\" must not include HTML!")
    )]
    pub body: String,
}

/// Every violation found in a payload, in field order
#[derive(Debug, Clone, PartialEq, Default, thiserror::Error)]
#[error("{}", .messages.join(","))]
pub struct ValidationFailure {
    /// One message per violation
    pub messages: Vec<String>,
}

/// Rejects text that an HTML sanitizer allowing no tags would alter.
fn reject_html(value: &str) -> Result<(), ValidationError> {
    if html_escape::encode_text(value) != value {
        return Err(ValidationError::new("escape_html"));
    }
    Ok(())
}

fn required_text(value: &Option<String>, label: &str) -> Result<String, String> {
    value
        .clone()
        .ok_or_else(|| format!("\"{}\" is required", label))
}

fn required_number(value: &Option<String>, label: &str) -> Result<f64, String> {
    let raw = value
        .as_deref()
        .ok_or_else(|| format!("\"{}\" is required", label))?;
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .ok_or_else(|| format!("\"{}\" must be a number", label))
}

fn required_integer(value: &Option<String>, label: &str) -> Result<i32, String> {
    let number = required_number(value, label)?;
    if number.fract() != 0.0 || number < i32::MIN as f64 || number > i32::MAX as f64 {
        return Err(format!("\"{}\" must be an integer", label));
    }
    Ok(number as i32)
}

/// Merges type errors and rule violations, one field at a time in `order`.
fn collect(
    order: &[&str],
    type_errors: HashMap<&str, String>,
    rules: Result<(), ValidationErrors>,
) -> Result<(), ValidationFailure> {
    let rule_errors = rules.err().unwrap_or_else(ValidationErrors::new);
    let field_errors = rule_errors.field_errors();

    let mut messages = Vec::new();
    for field in order {
        if let Some(message) = type_errors.get(field) {
            messages.push(message.clone());
            continue;
        }
        if let Some(errors) = field_errors.get(*field) {
            messages.extend(
                errors
                    .iter()
                    .filter_map(|error| error.message.as_ref().map(|m| m.to_string())),
            );
        }
    }

    if messages.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure { messages })
    }
}

/// Checks a submitted campground, returning its typed fields or every violation found.
pub fn validate_campground(payload: &CampgroundPayload) -> Result<CampgroundInput, ValidationFailure> {
    let mut type_errors = HashMap::new();

    let title = required_text(&payload.title, "campground.title")
        .map_err(|e| type_errors.insert("title", e))
        .unwrap_or_default();
    let price = required_number(&payload.price, "campground.price")
        .map_err(|e| type_errors.insert("price", e))
        .unwrap_or_default();
    let location = required_text(&payload.location, "campground.location")
        .map_err(|e| type_errors.insert("location", e))
        .unwrap_or_default();
    let description = required_text(&payload.description, "campground.description")
        .map_err(|e| type_errors.insert("description", e))
        .unwrap_or_default();

    let input = CampgroundInput {
        title,
        price,
        location,
        description,
    };
    let rules = input.validate();
    collect(&["title", "price", "location", "description"], type_errors, rules)?;
    Ok(input)
}

/// Checks a submitted review, returning its typed fields or every violation found.
pub fn validate_review(payload: &ReviewPayload) -> Result<ReviewInput, ValidationFailure> {
    let mut type_errors = HashMap::new();

    let rating = required_integer(&payload.rating, "review.rating")
        .map_err(|e| type_errors.insert("rating", e))
        .unwrap_or(1);
    let body = required_text(&payload.body, "review.body")
        .map_err(|e| type_errors.insert("body", e))
        .unwrap_or_default();

    let input = ReviewInput { rating, body };
    let rules = input.validate();
    collect(&["rating", "body"], type_errors, rules)?;
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campground(title: &str, price: &str) -> CampgroundPayload {
        CampgroundPayload {
            title: Some(title.to_string()),
            price: Some(price.to_string()),
            location: Some("Austin, TX".to_string()),
            description: Some("Shady sites near the river".to_string()),
        }
    }

    fn review(rating: &str, body: &str) -> ReviewPayload {
        ReviewPayload {
            rating: Some(rating.to_string()),
            body: Some(body.to_string()),
        }
    }

    #[test]
    fn test_valid_campground_passes_through_unmodified() {
        let input = validate_campground(&campground("  Misty Hollow ", "12.50")).unwrap();
        assert_eq!(input.title, "  Misty Hollow ");
        assert_eq!(input.price, 12.5);
        assert_eq!(input.location, "Austin, TX");
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let failure = validate_campground(&campground("Misty Hollow", "-1")).unwrap_err();
        assert_eq!(
            failure.messages,
            vec!["\"campground.price\" must be greater than or equal to 0"]
        );
    }

    #[test]
    fn test_zero_price_is_allowed() {
        assert!(validate_campground(&campground("Free Camp", "0")).is_ok());
    }

    #[test]
    fn test_script_title_is_rejected() {
        let failure =
            validate_campground(&campground("<script>alert(1)</script>", "10")).unwrap_err();
        assert_eq!(
            failure.messages,
            vec!["\"campground.title\" must not include HTML!"]
        );
    }

    #[test]
    fn test_all_violations_are_joined_in_field_order() {
        let payload = CampgroundPayload {
            title: None,
            price: Some("cheap".to_string()),
            location: Some("<b>Austin</b>".to_string()),
            description: Some(String::new()),
        };
        let failure = validate_campground(&payload).unwrap_err();
        assert_eq!(
            failure.to_string(),
            "\"campground.title\" is required,\"campground.price\" must be a number,\
             \"campground.location\" must not include HTML!,\
             \"campground.description\" is not allowed to be empty"
        );
    }

    #[test]
    fn test_non_finite_price_is_not_a_number() {
        let failure = validate_campground(&campground("Misty Hollow", "inf")).unwrap_err();
        assert_eq!(failure.messages, vec!["\"campground.price\" must be a number"]);
    }

    #[test]
    fn test_review_rating_bounds() {
        assert!(validate_review(&review("1", "Fine")).is_ok());
        assert!(validate_review(&review("5", "Great")).is_ok());

        for rating in ["0", "6", "-3"] {
            let failure = validate_review(&review(rating, "Meh")).unwrap_err();
            assert_eq!(
                failure.messages,
                vec!["\"review.rating\" must be between 1 and 5"],
                "rating {}",
                rating
            );
        }
    }

    #[test]
    fn test_review_rating_must_be_an_integer() {
        let failure = validate_review(&review("4.5", "Good")).unwrap_err();
        assert_eq!(failure.messages, vec!["\"review.rating\" must be an integer"]);

        let failure = validate_review(&review("five", "Good")).unwrap_err();
        assert_eq!(failure.messages, vec!["\"review.rating\" must be a number"]);
    }

    #[test]
    fn test_review_body_rejects_markup() {
        let failure = validate_review(&review("3", "<img src=x onerror=alert(1)>")).unwrap_err();
        assert_eq!(failure.messages, vec!["\"review.body\" must not include HTML!"]);
    }

    #[test]
    fn test_missing_review_fields() {
        let failure = validate_review(&ReviewPayload::default()).unwrap_err();
        assert_eq!(
            failure.messages,
            vec!["\"review.rating\" is required", "\"review.body\" is required"]
        );
    }
}
