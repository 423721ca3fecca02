// Public OAuth 2.0 endpoints of each supported identity provider.

pub(super) const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub(super) const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

pub(super) const FACEBOOK_AUTH_URL: &str = "https://www.facebook.com/v3.2/dialog/oauth";
pub(super) const FACEBOOK_TOKEN_URL: &str = "https://graph.facebook.com/v3.2/oauth/access_token";

pub(super) const GITHUB_AUTH_URL: &str = "https://github.com/login/oauth/authorize";
pub(super) const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";

pub(super) const VK_AUTH_URL: &str = "https://oauth.vk.com/authorize";
pub(super) const VK_TOKEN_URL: &str = "https://oauth.vk.com/access_token";

pub(super) const ODNOKLASSNIKI_AUTH_URL: &str = "https://connect.ok.ru/oauth/authorize";
pub(super) const ODNOKLASSNIKI_TOKEN_URL: &str = "https://api.ok.ru/oauth/token.do";
