//! Job market lookups, proxied through an external search provider so the
//! frontend never handles the provider key.

pub mod client;
pub mod handlers;

/// Job categories offered for browsing. Static: the provider has no
/// category endpoint, and these track the skill paths the app targets.
pub const JOB_CATEGORIES: &[&str] = &[
    "Software Engineering",
    "Data Science",
    "Machine Learning",
    "DevOps",
    "Cybersecurity",
    "Product Management",
    "UI/UX Design",
    "Cloud Engineering",
];
