// src/ingest/providers/curated.rs
//! Static curated tables standing in for sources that block scraping or have
//! no feed. `CuratedProvider` has the same contract as a live provider, so a
//! table can be swapped for a fetch without touching the pipeline.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;

use crate::ingest::normalize::{FieldDefaults, RawListing, SourceProfile};
use crate::ingest::types::SourceProvider;
use crate::resource::{LocationType, Resource, ResourceKind};

/// One row of a curated table. Empty strings mean "use the profile default".
#[derive(Debug, Clone, Copy)]
pub struct CuratedEntry {
    pub title: &'static str,
    pub description: &'static str,
    pub company: &'static str,
    pub location: &'static str,
    pub requirements: &'static str,
    pub benefits: &'static str,
    pub duration: &'static str,
    pub source_url: &'static str,
}

impl CuratedEntry {
    const BLANK: CuratedEntry = CuratedEntry {
        title: "",
        description: "",
        company: "",
        location: "",
        requirements: "",
        benefits: "",
        duration: "",
        source_url: "",
    };

    pub fn to_raw(self) -> RawListing {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        RawListing {
            title: self.title.to_string(),
            description: opt(self.description),
            company: opt(self.company),
            location: opt(self.location),
            requirements: opt(self.requirements),
            benefits: opt(self.benefits),
            duration: opt(self.duration),
            source_url: opt(self.source_url),
        }
    }
}

pub struct CuratedProvider {
    name: &'static str,
    profile: SourceProfile,
    entries: Vec<RawListing>,
}

fn raws(entries: &[CuratedEntry]) -> Vec<RawListing> {
    entries.iter().map(|e| e.to_raw()).collect()
}

impl CuratedProvider {
    pub fn new(name: &'static str, profile: SourceProfile, entries: Vec<RawListing>) -> Self {
        Self {
            name,
            profile,
            entries,
        }
    }

    pub fn wellfound_jobs() -> Self {
        Self::new("wellfound", WELLFOUND_PROFILE, raws(&WELLFOUND_JOBS))
    }

    pub fn freecodecamp_courses() -> Self {
        Self::new("freecodecamp", FCC_PROFILE, raws(&FCC_COURSES))
    }

    pub fn coursera_courses() -> Self {
        Self::new("coursera", COURSERA_PROFILE, raws(&COURSERA_COURSES))
    }

    /// Tools get a web-search link and a category-specific benefits line.
    pub fn free_tools() -> Self {
        let entries = FREE_TOOLS.iter().map(|t| t.to_raw()).collect();
        Self::new("tools", TOOLS_PROFILE, entries)
    }
}

#[async_trait]
impl SourceProvider for CuratedProvider {
    async fn fetch_latest(&self) -> Result<Vec<Resource>> {
        let now = Utc::now();
        Ok(self
            .entries
            .iter()
            .filter_map(|raw| self.profile.normalize(raw.clone(), now))
            .collect())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

pub const WELLFOUND_PROFILE: SourceProfile = SourceProfile::new(
    "auto_scraper_angel",
    "wellfound.com",
    ResourceKind::Job,
    LocationType::Worldwide,
)
.with_defaults(FieldDefaults {
    description: "",
    location: Some("Remote/Worldwide"),
    company: None,
    source_url: "https://wellfound.com",
    requirements: "",
    benefits: "Equity, Remote work, Startup environment, Growth opportunities",
    duration: "Full-time",
});

pub const FCC_PROFILE: SourceProfile = SourceProfile::new(
    "auto_scraper_fcc",
    "freecodecamp.org",
    ResourceKind::Course,
    LocationType::Worldwide,
)
.with_defaults(FieldDefaults {
    description: "",
    location: Some("Online"),
    company: None,
    source_url: "https://www.freecodecamp.org",
    requirements: "Basic computer skills, Internet connection",
    benefits: "Free certification, Hands-on projects, Community support, Lifetime access",
    duration: "300 hours",
});

pub const COURSERA_PROFILE: SourceProfile = SourceProfile::new(
    "auto_scraper_coursera",
    "coursera.org",
    ResourceKind::Course,
    LocationType::Worldwide,
)
.with_defaults(FieldDefaults {
    description: "",
    location: Some("Online"),
    company: None,
    source_url: "https://www.coursera.org",
    requirements: "Basic computer skills, English proficiency",
    benefits: "University certificate, Financial aid available, Peer interaction, Expert instruction",
    duration: "",
});

pub const TOOLS_PROFILE: SourceProfile = SourceProfile::new(
    "auto_scraper_tools",
    "curated_list",
    ResourceKind::Tool,
    LocationType::Worldwide,
)
.with_defaults(FieldDefaults {
    description: "",
    location: None,
    company: None,
    source_url: "",
    requirements: "Basic computer skills",
    benefits: "Free to use, Regular updates, Community support",
    duration: "Free",
});

pub const WELLFOUND_JOBS: [CuratedEntry; 3] = [
    CuratedEntry {
        title: "Frontend Developer at Tech Startup",
        company: "Innovative Startup",
        description: "Join our fast-growing startup as a Frontend Developer. Work with React, Next.js, and modern technologies.",
        requirements: "React, JavaScript, CSS, Git, Startup experience",
        ..CuratedEntry::BLANK
    },
    CuratedEntry {
        title: "Full Stack Engineer - Remote",
        company: "Global Startup",
        description: "Build scalable web applications for our global user base. Full remote position.",
        requirements: "Node.js, React, MongoDB, AWS, Remote work",
        ..CuratedEntry::BLANK
    },
    CuratedEntry {
        title: "Product Manager - SaaS",
        company: "SaaS Startup",
        description: "Lead product development for our SaaS platform. Experience with B2B products preferred.",
        requirements: "Product management, SaaS, Analytics, Communication",
        ..CuratedEntry::BLANK
    },
];

pub const FCC_COURSES: [CuratedEntry; 5] = [
    CuratedEntry {
        title: "Responsive Web Design Certification",
        description: "Learn HTML, CSS, and responsive design principles. Build 5 projects to earn your certification.",
        ..CuratedEntry::BLANK
    },
    CuratedEntry {
        title: "JavaScript Algorithms and Data Structures",
        description: "Learn JavaScript fundamentals, ES6, algorithms, and data structures.",
        ..CuratedEntry::BLANK
    },
    CuratedEntry {
        title: "Front End Development Libraries",
        description: "Learn React, Redux, Sass, Bootstrap, and jQuery.",
        ..CuratedEntry::BLANK
    },
    CuratedEntry {
        title: "Data Visualization",
        description: "Learn D3.js and create interactive data visualizations.",
        ..CuratedEntry::BLANK
    },
    CuratedEntry {
        title: "Back End Development and APIs",
        description: "Learn Node.js, Express, MongoDB, and build APIs.",
        ..CuratedEntry::BLANK
    },
];

pub const COURSERA_COURSES: [CuratedEntry; 3] = [
    CuratedEntry {
        title: "Machine Learning by Stanford University",
        description: "Learn machine learning algorithms and techniques from Andrew Ng.",
        duration: "61 hours",
        company: "Stanford University",
        ..CuratedEntry::BLANK
    },
    CuratedEntry {
        title: "Python for Everybody by University of Michigan",
        description: "Learn Python programming from basics to data structures.",
        duration: "8 months",
        company: "University of Michigan",
        ..CuratedEntry::BLANK
    },
    CuratedEntry {
        title: "Google IT Support Professional Certificate",
        description: "Prepare for a career in IT support with hands-on training.",
        duration: "6 months",
        company: "Google",
        ..CuratedEntry::BLANK
    },
];

/// Tool rows carry a category and platform list instead of full fields.
#[derive(Debug, Clone, Copy)]
pub struct ToolRow {
    pub title: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub platform: &'static str,
}

impl ToolRow {
    fn to_raw(self) -> RawListing {
        RawListing {
            title: self.title.to_string(),
            description: Some(self.description.to_string()),
            location: Some(self.platform.to_string()),
            benefits: Some(format!(
                "Free to use, {}, Regular updates, Community support",
                self.category
            )),
            source_url: Some(format!(
                "https://www.google.com/search?q={}",
                self.title.replace(' ', "+")
            )),
            ..Default::default()
        }
    }
}

pub const FREE_TOOLS: [ToolRow; 6] = [
    ToolRow {
        title: "Visual Studio Code",
        description: "Free source-code editor with debugging, syntax highlighting, and Git integration.",
        category: "Code Editor",
        platform: "Windows, Mac, Linux",
    },
    ToolRow {
        title: "Figma",
        description: "Free collaborative interface design tool with real-time collaboration.",
        category: "Design Tool",
        platform: "Web, Desktop",
    },
    ToolRow {
        title: "GitHub",
        description: "Free Git repository hosting with collaboration features and CI/CD.",
        category: "Version Control",
        platform: "Web, Desktop, Mobile",
    },
    ToolRow {
        title: "Canva",
        description: "Free graphic design platform with templates and drag-and-drop interface.",
        category: "Design Tool",
        platform: "Web, Mobile",
    },
    ToolRow {
        title: "Notion",
        description: "Free all-in-one workspace for notes, tasks, wikis, and databases.",
        category: "Productivity",
        platform: "Web, Desktop, Mobile",
    },
    ToolRow {
        title: "Postman",
        description: "Free API development and testing tool with collaboration features.",
        category: "API Tool",
        platform: "Web, Desktop",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tables_produce_expected_counts() {
        assert_eq!(CuratedProvider::wellfound_jobs().fetch_latest().await.unwrap().len(), 3);
        assert_eq!(CuratedProvider::freecodecamp_courses().fetch_latest().await.unwrap().len(), 5);
        assert_eq!(CuratedProvider::coursera_courses().fetch_latest().await.unwrap().len(), 3);
        assert_eq!(CuratedProvider::free_tools().fetch_latest().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn tool_rows_get_search_link_and_category_benefits() {
        let tools = CuratedProvider::free_tools().fetch_latest().await.unwrap();
        let vsc = tools.iter().find(|r| r.title() == "Visual Studio Code").unwrap();
        assert_eq!(
            vsc.source_url(),
            "https://www.google.com/search?q=Visual+Studio+Code"
        );
        assert_eq!(
            vsc.benefits(),
            "Free to use, Code Editor, Regular updates, Community support"
        );
        assert_eq!(vsc.location(), Some("Windows, Mac, Linux"));
        assert_eq!(vsc.duration(), "Free");
        assert_eq!(vsc.scraped_from(), "curated_list");
        assert_eq!(vsc.kind(), ResourceKind::Tool);
    }

    #[tokio::test]
    async fn coursera_rows_keep_their_own_duration_and_university() {
        let courses = CuratedProvider::coursera_courses().fetch_latest().await.unwrap();
        assert_eq!(courses[0].duration(), "61 hours");
        assert_eq!(courses[0].company(), Some("Stanford University"));
        let fcc = CuratedProvider::freecodecamp_courses().fetch_latest().await.unwrap();
        assert!(fcc.iter().all(|c| c.duration() == "300 hours" && c.company().is_none()));
    }
}
