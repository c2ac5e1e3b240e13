use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTestimonialModel {
    #[validate(length(min = 1, max = 100, message = "Author name must be 1-100 characters long"))]
    pub author_name: String,
    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTestimonialModel {
    #[validate(length(min = 1, max = 100, message = "Author name must be 1-100 characters long"))]
    pub author_name: Option<String>,
    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: Option<String>,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i16>,
    pub is_published: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_must_be_one_to_five() {
        let mut model = CreateTestimonialModel {
            author_name: "Lan".into(),
            content: "Found our flat in a week".into(),
            rating: 5,
            is_published: false,
        };
        assert!(model.validate().is_ok());
        model.rating = 0;
        assert!(model.validate().is_err());
        assert!(UpdateTestimonialModel { rating: Some(6), ..Default::default() }.validate().is_err());
    }
}
