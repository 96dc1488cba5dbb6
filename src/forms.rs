//! Request-form binding and validation.
//!
//! Every form enumerates its editable fields explicitly; raw values stay
//! strings so a failed submission can be re-rendered exactly as typed, and
//! `validate` produces the typed input the query layer works with.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Cook, Ingredient};

pub const MIN_PASSWORD_LEN: usize = 8;

const REQUIRED: &str = "This field is required.";
const WHOLE_NUMBER: &str = "Enter a whole number.";
const BAD_PRICE: &str = "Enter a valid price.";

/// Field name → first error message for that field.
#[derive(Debug, Default, Serialize)]
pub struct FormErrors(BTreeMap<&'static str, String>);

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }
}

fn parse_optional_i32(raw: &str) -> Result<Option<i32>, ()> {
    let raw = raw.trim();
    if raw.is_empty() {
        Ok(None)
    } else {
        raw.parse().map(Some).map_err(|_| ())
    }
}

/// Parses a non-negative decimal with at most eight integer digits and two
/// fractional digits into minor units.
pub fn parse_price(raw: &str) -> Result<i64, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(REQUIRED);
    }
    let (whole, fraction) = match raw.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (raw, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(BAD_PRICE);
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(BAD_PRICE);
    }
    if whole.len() > 8 {
        return Err("Ensure the price has at most 8 digits before the decimal point.");
    }
    if fraction.len() > 2 {
        return Err("Ensure the price has at most 2 decimal places.");
    }
    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| BAD_PRICE)?
    };
    let cents: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| BAD_PRICE)? * 10,
        _ => fraction.parse().map_err(|_| BAD_PRICE)?,
    };
    Ok(whole * 100 + cents)
}

pub fn format_price(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CookRegistrationForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub years_of_experience: String,
    #[serde(default, skip_serializing)]
    pub password1: String,
    #[serde(default, skip_serializing)]
    pub password2: String,
}

#[derive(Debug)]
pub struct RegistrationInput {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub years_of_experience: Option<i32>,
    pub password: String,
}

impl CookRegistrationForm {
    pub fn validate(&self) -> Result<RegistrationInput, FormErrors> {
        let mut errors = FormErrors::default();

        let username = self.username.trim();
        if username.is_empty() {
            errors.add("username", REQUIRED);
        }

        let email = self.email.trim();
        if !email.is_empty() && !email.contains('@') {
            errors.add("email", "Enter a valid email address.");
        }

        let years_of_experience = match parse_optional_i32(&self.years_of_experience) {
            Ok(years) => {
                if matches!(years, Some(y) if y < 0) {
                    errors.add("years_of_experience", "Experience cannot be negative.");
                }
                years
            }
            Err(()) => {
                errors.add("years_of_experience", WHOLE_NUMBER);
                None
            }
        };

        if self.password1.len() < MIN_PASSWORD_LEN {
            errors.add(
                "password1",
                format!("Password must be at least {MIN_PASSWORD_LEN} characters long."),
            );
        } else if self.password1 != self.password2 {
            errors.add("password2", "The two password fields didn't match.");
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(RegistrationInput {
            username: username.to_owned(),
            first_name: self.first_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
            email: email.to_owned(),
            years_of_experience,
            password: self.password1.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CookUpdateForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub years_of_experience: String,
}

#[derive(Debug)]
pub struct CookUpdateInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub years_of_experience: Option<i32>,
}

impl CookUpdateForm {
    pub fn from_cook(cook: &Cook) -> Self {
        CookUpdateForm {
            first_name: cook.first_name.clone(),
            last_name: cook.last_name.clone(),
            email: cook.email.clone(),
            years_of_experience: cook
                .years_of_experience
                .map(|y| y.to_string())
                .unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<CookUpdateInput, FormErrors> {
        let mut errors = FormErrors::default();

        let email = self.email.trim();
        if !email.is_empty() && !email.contains('@') {
            errors.add("email", "Enter a valid email address.");
        }

        let years_of_experience = match parse_optional_i32(&self.years_of_experience) {
            Ok(years) => years,
            Err(()) => {
                errors.add("years_of_experience", WHOLE_NUMBER);
                None
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(CookUpdateInput {
            first_name: self.first_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
            email: email.to_owned(),
            years_of_experience,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IngredientForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub type_id: String,
}

#[derive(Debug)]
pub struct IngredientInput {
    pub name: String,
    pub quantity: Option<i32>,
    pub type_id: i64,
}

impl IngredientForm {
    pub fn from_ingredient(ingredient: &Ingredient) -> Self {
        IngredientForm {
            name: ingredient.name.clone(),
            quantity: ingredient.quantity.map(|q| q.to_string()).unwrap_or_default(),
            type_id: ingredient.type_id.to_string(),
        }
    }

    /// The type currently picked in the form, for marking the select option.
    pub fn selected_type_id(&self) -> i64 {
        self.type_id.trim().parse().unwrap_or(0)
    }

    pub fn validate(&self) -> Result<IngredientInput, FormErrors> {
        let mut errors = FormErrors::default();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", REQUIRED);
        }

        let quantity = match parse_optional_i32(&self.quantity) {
            Ok(quantity) => quantity,
            Err(()) => {
                errors.add("quantity", WHOLE_NUMBER);
                None
            }
        };

        let type_id = match self.type_id.trim().parse::<i64>() {
            Ok(id) => id,
            Err(_) => {
                errors.add("type_id", "Select a valid ingredient type.");
                0
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(IngredientInput {
            name: name.to_owned(),
            quantity,
            type_id,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DishForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub dish_type_id: String,
    pub ingredient_ids: Vec<i64>,
    pub cook_ids: Vec<i64>,
}

#[derive(Debug)]
pub struct DishInput {
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub dish_type_id: i64,
    pub ingredient_ids: Vec<i64>,
    pub cook_ids: Vec<i64>,
}

impl DishForm {
    /// Binds an urlencoded body by hand: the ingredient and cook selects
    /// submit one `ingredients=`/`cooks=` pair per chosen option, which a
    /// flat struct deserializer cannot collect.
    pub fn from_urlencoded(body: &str) -> Self {
        let mut form = DishForm::default();
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(body).unwrap_or_default();
        for (key, value) in pairs {
            match key.as_str() {
                "name" => form.name = value,
                "description" => form.description = value,
                "price" => form.price = value,
                "dish_type_id" => form.dish_type_id = value,
                "ingredients" => {
                    if let Ok(id) = value.trim().parse() {
                        form.ingredient_ids.push(id);
                    }
                }
                "cooks" => {
                    if let Ok(id) = value.trim().parse() {
                        form.cook_ids.push(id);
                    }
                }
                _ => {}
            }
        }
        form
    }

    pub fn selected_type_id(&self) -> i64 {
        self.dish_type_id.trim().parse().unwrap_or(0)
    }

    pub fn validate(&self) -> Result<DishInput, FormErrors> {
        let mut errors = FormErrors::default();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", REQUIRED);
        }
        let description = self.description.trim();
        if description.is_empty() {
            errors.add("description", REQUIRED);
        }

        let price_cents = match parse_price(&self.price) {
            Ok(cents) => cents,
            Err(message) => {
                errors.add("price", message);
                0
            }
        };

        let dish_type_id = match self.dish_type_id.trim().parse::<i64>() {
            Ok(id) => id,
            Err(_) => {
                errors.add("dish_type_id", "Select a valid dish type.");
                0
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(DishInput {
            name: name.to_owned(),
            description: description.to_owned(),
            price_cents,
            dish_type_id,
            ingredient_ids: self.ingredient_ids.clone(),
            cook_ids: self.cook_ids.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_parsing() {
        assert_eq!(parse_price("12"), Ok(1200));
        assert_eq!(parse_price("12.5"), Ok(1250));
        assert_eq!(parse_price("12.50"), Ok(1250));
        assert_eq!(parse_price(".75"), Ok(75));
        assert_eq!(parse_price("0"), Ok(0));
        assert_eq!(parse_price(" 8.10 "), Ok(810));
        assert_eq!(parse_price("99999999.99"), Ok(9_999_999_999));

        assert!(parse_price("").is_err());
        assert!(parse_price(".").is_err());
        assert!(parse_price("-1").is_err());
        assert!(parse_price("1,50").is_err());
        assert!(parse_price("soup").is_err());
        assert!(parse_price("12.345").is_err());
        assert!(parse_price("123456789").is_err());
    }

    #[test]
    fn price_formatting() {
        assert_eq!(format_price(0), "0.00");
        assert_eq!(format_price(75), "0.75");
        assert_eq!(format_price(1250), "12.50");
    }

    #[test]
    fn registration_accepts_a_complete_form() {
        let form = CookRegistrationForm {
            username: "gordon".into(),
            first_name: "Gordon".into(),
            last_name: "Ramsay".into(),
            email: "gordon@example.com".into(),
            years_of_experience: "25".into(),
            password1: "beef-wellington".into(),
            password2: "beef-wellington".into(),
        };
        let input = form.validate().expect("form is valid");
        assert_eq!(input.username, "gordon");
        assert_eq!(input.years_of_experience, Some(25));
    }

    #[test]
    fn registration_requires_username_and_matching_passwords() {
        let form = CookRegistrationForm {
            password1: "long-enough-password".into(),
            password2: "different-password".into(),
            ..CookRegistrationForm::default()
        };
        let errors = form.validate().expect_err("form is invalid");
        assert_eq!(errors.get("username"), Some(REQUIRED));
        assert!(errors.get("password2").is_some());
    }

    #[test]
    fn registration_rejects_short_passwords_and_bad_years() {
        let form = CookRegistrationForm {
            username: "gordon".into(),
            years_of_experience: "many".into(),
            password1: "short".into(),
            password2: "short".into(),
            ..CookRegistrationForm::default()
        };
        let errors = form.validate().expect_err("form is invalid");
        assert_eq!(errors.get("years_of_experience"), Some(WHOLE_NUMBER));
        assert!(errors.get("password1").is_some());
    }

    #[test]
    fn ingredient_quantity_is_optional() {
        let form = IngredientForm {
            name: "Paprika".into(),
            quantity: "".into(),
            type_id: "3".into(),
        };
        let input = form.validate().expect("form is valid");
        assert_eq!(input.quantity, None);
        assert_eq!(input.type_id, 3);

        let form = IngredientForm {
            quantity: "a pinch".into(),
            ..form
        };
        let errors = form.validate().expect_err("form is invalid");
        assert_eq!(errors.get("quantity"), Some(WHOLE_NUMBER));
    }

    #[test]
    fn dish_form_collects_repeated_select_pairs() {
        let form = DishForm::from_urlencoded(
            "name=Borscht&description=Beet+soup&price=10.50&dish_type_id=2\
             &ingredients=1&ingredients=3&cooks=2",
        );
        assert_eq!(form.name, "Borscht");
        assert_eq!(form.description, "Beet soup");
        assert_eq!(form.ingredient_ids, vec![1, 3]);
        assert_eq!(form.cook_ids, vec![2]);

        let input = form.validate().expect("form is valid");
        assert_eq!(input.price_cents, 1050);
        assert_eq!(input.dish_type_id, 2);
    }

    #[test]
    fn dish_form_reports_field_errors() {
        let form = DishForm::from_urlencoded("name=&description=&price=free&dish_type_id=");
        let errors = form.validate().expect_err("form is invalid");
        assert_eq!(errors.get("name"), Some(REQUIRED));
        assert_eq!(errors.get("description"), Some(REQUIRED));
        assert_eq!(errors.get("price"), Some(BAD_PRICE));
        assert!(errors.get("dish_type_id").is_some());
    }
}
