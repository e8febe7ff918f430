//! Browser Identity
//!
//! Random browser client identifier, matching User-Agent and the request
//! headers a browser of that family sends to gmgn.ai.

use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, DNT, REFERER, USER_AGENT};

use crate::ports::GmgnError;

/// Browser client identifiers (tls-client labels)
pub const BROWSER_IDENTIFIERS: &[&str] = &[
    "chrome_103",
    "chrome_104",
    "chrome_105",
    "chrome_106",
    "chrome_107",
    "chrome_108",
    "chrome_109",
    "chrome_110",
    "chrome_111",
    "chrome_112",
    "chrome_116_PSK",
    "chrome_116_PSK_PQ",
    "chrome_117",
    "chrome_120",
    "safari_15_6_1",
    "safari_16_0",
    "safari_ipad_15_6",
    "safari_ios_15_5",
    "safari_ios_15_6",
    "safari_ios_16_0",
    "firefox_102",
    "firefox_104",
    "firefox_105",
    "firefox_106",
    "firefox_108",
    "firefox_110",
    "firefox_117",
    "firefox_120",
    "opera_89",
    "opera_90",
    "opera_91",
];

/// Opera N ships Chromium N + 14
const OPERA_CHROMIUM_OFFSET: u32 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserFamily {
    Chrome,
    Safari,
    Firefox,
    Opera,
}

impl BrowserFamily {
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "chrome" => Some(BrowserFamily::Chrome),
            "safari" => Some(BrowserFamily::Safari),
            "firefox" => Some(BrowserFamily::Firefox),
            "opera" => Some(BrowserFamily::Opera),
            _ => None,
        }
    }

    pub fn is_chromium(&self) -> bool {
        matches!(self, BrowserFamily::Chrome | BrowserFamily::Opera)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Ios,
}

impl Platform {
    fn client_hint(&self) -> &'static str {
        match self {
            Platform::Windows => "\"Windows\"",
            Platform::MacOs => "\"macOS\"",
            Platform::Ios => "\"iOS\"",
        }
    }
}

/// Identifier + User-Agent pair used for one session
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserIdentity {
    pub identifier: String,
    pub family: Option<BrowserFamily>,
    pub platform: Platform,
    /// Version components taken from the identifier, e.g. `["15", "6", "1"]`
    pub version: Vec<String>,
    pub user_agent: String,
}

impl BrowserIdentity {
    /// Pick a random identifier and derive its identity
    pub fn random<R: Rng + ?Sized>(rng: &mut R, fallback_user_agents: &[String]) -> Self {
        let identifier = BROWSER_IDENTIFIERS.choose(rng).copied().unwrap_or("chrome_120");
        Self::from_identifier(identifier, rng, fallback_user_agents)
    }

    /// Derive platform and User-Agent from a tls-client style label.
    ///
    /// Unknown labels keep the identifier but take a random fallback agent.
    pub fn from_identifier<R: Rng + ?Sized>(
        identifier: &str,
        rng: &mut R,
        fallback_user_agents: &[String],
    ) -> Self {
        let mut parts = identifier.split('_');
        let family = parts.next().and_then(BrowserFamily::from_label);
        let rest: Vec<&str> = parts.collect();

        let mobile = rest.first().is_some_and(|p| *p == "ios" || *p == "ipad");
        let version: Vec<String> = rest
            .iter()
            .filter(|p| !matches!(**p, "ios" | "ipad"))
            .take_while(|p| p.chars().all(|c| c.is_ascii_digit()))
            .map(|p| p.to_string())
            .collect();

        let platform = match family {
            Some(BrowserFamily::Safari) if mobile => Platform::Ios,
            Some(BrowserFamily::Safari) => Platform::MacOs,
            _ => Platform::Windows,
        };

        let user_agent = family
            .and_then(|f| build_user_agent(f, platform, &version, rest.first() == Some(&"ipad")))
            .unwrap_or_else(|| fallback_user_agent(rng, fallback_user_agents));

        Self {
            identifier: identifier.to_string(),
            family,
            platform,
            version,
            user_agent,
        }
    }

    fn major_version(&self) -> Option<u32> {
        self.version.first().and_then(|v| v.parse().ok())
    }

    /// `(sec-ch-ua, sec-ch-ua-mobile, sec-ch-ua-platform)` for Chromium browsers
    pub fn client_hints(&self) -> Option<(String, &'static str, &'static str)> {
        let family = self.family.filter(|f| f.is_chromium())?;
        let major = self.major_version()?;
        let brands = match family {
            BrowserFamily::Opera => {
                let chromium = major + OPERA_CHROMIUM_OFFSET;
                format!(
                    "\"Opera\";v=\"{}\", \"Chromium\";v=\"{}\", \"Not_A Brand\";v=\"24\"",
                    major, chromium
                )
            }
            _ => format!(
                "\"Chromium\";v=\"{}\", \"Google Chrome\";v=\"{}\", \"Not_A Brand\";v=\"24\"",
                major, major
            ),
        };
        Some((brands, "?0", self.platform.client_hint()))
    }

    /// Default headers sent with every request of the session
    pub fn headers(&self, accept_language: &str, referer: &str) -> Result<HeaderMap, GmgnError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(ACCEPT_LANGUAGE, header_value(accept_language)?);
        headers.insert(DNT, HeaderValue::from_static("1"));
        headers.insert(HeaderName::from_static("priority"), HeaderValue::from_static("u=1, i"));
        headers.insert(REFERER, header_value(referer)?);
        headers.insert(USER_AGENT, header_value(&self.user_agent)?);

        if let Some((brands, mobile, platform)) = self.client_hints() {
            headers.insert(HeaderName::from_static("sec-ch-ua"), header_value(&brands)?);
            headers.insert(HeaderName::from_static("sec-ch-ua-mobile"), HeaderValue::from_static(mobile));
            headers.insert(HeaderName::from_static("sec-ch-ua-platform"), HeaderValue::from_static(platform));
        }

        Ok(headers)
    }
}

fn header_value(value: &str) -> Result<HeaderValue, GmgnError> {
    HeaderValue::from_str(value).map_err(|e| GmgnError::Config(format!("invalid header value '{}': {}", value, e)))
}

fn fallback_user_agent<R: Rng + ?Sized>(rng: &mut R, user_agents: &[String]) -> String {
    user_agents
        .choose(rng)
        .cloned()
        .unwrap_or_else(|| chrome_user_agent(120))
}

fn chrome_user_agent(major: u32) -> String {
    format!(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{}.0.0.0 Safari/537.36",
        major
    )
}

fn build_user_agent(family: BrowserFamily, platform: Platform, version: &[String], ipad: bool) -> Option<String> {
    let major: u32 = version.first()?.parse().ok()?;

    let agent = match family {
        BrowserFamily::Chrome => chrome_user_agent(major),
        BrowserFamily::Opera => format!(
            "{} OPR/{}.0.0.0",
            chrome_user_agent(major + OPERA_CHROMIUM_OFFSET),
            major
        ),
        BrowserFamily::Firefox => format!(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:{}.0) Gecko/20100101 Firefox/{}.0",
            major, major
        ),
        BrowserFamily::Safari => {
            let dotted = version.join(".");
            match platform {
                Platform::Ios => {
                    let device = if ipad { "iPad; CPU OS" } else { "iPhone; CPU iPhone OS" };
                    format!(
                        "Mozilla/5.0 ({} {} like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/{} Mobile/15E148 Safari/604.1",
                        device,
                        version.join("_"),
                        dotted
                    )
                }
                _ => format!(
                    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/{} Safari/605.1.15",
                    dotted
                ),
            }
        }
    };

    Some(agent)
}
