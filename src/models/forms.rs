use serde::Deserialize;

// Missing form fields deserialize as empty strings so they reach validation.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub confirm_password: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PageQuery {
    pub error: Option<String>,
}
