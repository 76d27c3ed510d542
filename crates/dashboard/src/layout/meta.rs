//! Base SEO and social card tags
//!
//! Every page starts from the same title, description and share image; only
//! the canonical URL follows the request.

use serde::Serialize;
use url::Url;

const SITE_NAME: &str = "ClassroomIO";
const TITLE: &str = "ClassroomIO | The Open Source Learning Management System for Companies";
const DESCRIPTION: &str = "A flexible, user-friendly platform for creating, managing, and delivering courses for companies and training organisations";
const OG_IMAGE_URL: &str = "https://brand.cdn.clsrio.com/og/classroomio-og.png";
const OG_IMAGE_ALT: &str = "ClassroomIO OG Image";
const TWITTER_HANDLE: &str = "@classroomio";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseMetaTags {
    pub title: &'static str,
    pub description: &'static str,
    pub canonical: String,
    pub open_graph: OpenGraph,
    pub twitter: TwitterCard,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenGraph {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub url: String,
    pub locale: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub site_name: &'static str,
    pub images: Vec<OpenGraphImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenGraphImage {
    pub url: &'static str,
    pub alt: &'static str,
    pub width: u32,
    pub height: u32,
    pub secure_url: &'static str,
    #[serde(rename = "type")]
    pub mime_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TwitterCard {
    pub handle: &'static str,
    pub site: &'static str,
    pub card_type: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub image: &'static str,
    pub image_alt: &'static str,
}

impl BaseMetaTags {
    /// Build the tags for a request URL
    pub fn for_url(url: &Url) -> Self {
        let canonical = canonical_url(url);

        Self {
            title: TITLE,
            description: DESCRIPTION,
            canonical: canonical.clone(),
            open_graph: OpenGraph {
                kind: "website",
                url: canonical,
                locale: "en_IE",
                title: TITLE,
                description: DESCRIPTION,
                site_name: SITE_NAME,
                images: vec![OpenGraphImage {
                    url: OG_IMAGE_URL,
                    alt: OG_IMAGE_ALT,
                    width: 1920,
                    height: 1080,
                    secure_url: OG_IMAGE_URL,
                    mime_type: "image/jpeg",
                }],
            },
            twitter: TwitterCard {
                handle: TWITTER_HANDLE,
                site: TWITTER_HANDLE,
                card_type: "summary_large_image",
                title: TITLE,
                description: DESCRIPTION,
                image: OG_IMAGE_URL,
                image_alt: OG_IMAGE_ALT,
            },
        }
    }
}

/// Origin plus path; query string and fragment are dropped
pub fn canonical_url(url: &Url) -> String {
    let mut canonical = url.clone();
    canonical.set_query(None);
    canonical.set_fragment(None);
    canonical.to_string()
}
