use crate::context::preferences::Language;
use crate::models::organization::Organization;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Dashboard,
    Chandas,
    Sponsorships,
    Expenses,
    Gallery,
    Voting,
    Festivals,
    Activity,
    Settings,
}

pub const SECTIONS: [Section; 9] = [
    Section::Dashboard,
    Section::Chandas,
    Section::Sponsorships,
    Section::Expenses,
    Section::Gallery,
    Section::Voting,
    Section::Festivals,
    Section::Activity,
    Section::Settings,
];

impl Section {
    /// Name used in `enabled_pages`.
    pub fn page_key(&self) -> &'static str {
        match self {
            Section::Dashboard => "dashboard",
            Section::Chandas => "chandas",
            Section::Sponsorships => "sponsorships",
            Section::Expenses => "expenses",
            Section::Gallery => "gallery",
            Section::Voting => "voting",
            Section::Festivals => "festivals",
            Section::Activity => "activity",
            Section::Settings => "settings",
        }
    }

    pub fn label(&self, language: Language) -> &'static str {
        match (self, language) {
            (Section::Dashboard, Language::English) => "Dashboard",
            (Section::Dashboard, Language::Telugu) => "డ్యాష్‌బోర్డ్",
            (Section::Chandas, Language::English) => "Chandas",
            (Section::Chandas, Language::Telugu) => "చందాలు",
            (Section::Sponsorships, Language::English) => "Sponsorships",
            (Section::Sponsorships, Language::Telugu) => "స్పాన్సర్‌షిప్‌లు",
            (Section::Expenses, Language::English) => "Expenses",
            (Section::Expenses, Language::Telugu) => "ఖర్చులు",
            (Section::Gallery, Language::English) => "Gallery",
            (Section::Gallery, Language::Telugu) => "గ్యాలరీ",
            (Section::Voting, Language::English) => "Voting",
            (Section::Voting, Language::Telugu) => "ఓటింగ్",
            (Section::Festivals, Language::English) => "Festivals",
            (Section::Festivals, Language::Telugu) => "పండుగలు",
            (Section::Activity, Language::English) => "Activity",
            (Section::Activity, Language::Telugu) => "కార్యకలాపాలు",
            (Section::Settings, Language::English) => "Settings",
            (Section::Settings, Language::Telugu) => "సెట్టింగ్‌లు",
        }
    }

    pub fn href(&self, slug: &str) -> String {
        match self {
            Section::Dashboard => format!("/org/{slug}"),
            other => format!("/org/{slug}/{}", other.page_key()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub section: Section,
    pub label: &'static str,
    pub href: String,
}

/// Sections the organization shows. The dashboard is always there; every
/// other section must be listed in `enabled_pages` when that list is set.
pub fn visible_sections(organization: &Organization, language: Language) -> Vec<NavItem> {
    SECTIONS
        .iter()
        .filter(|s| **s == Section::Dashboard || organization.is_page_enabled(s.page_key()))
        .map(|s| NavItem {
            section: *s,
            label: s.label(language),
            href: s.href(&organization.slug),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::organization::sample_organization;

    #[test]
    fn everything_shows_without_a_list() {
        let org = sample_organization("ganesh");
        assert_eq!(visible_sections(&org, Language::English).len(), SECTIONS.len());
    }

    #[test]
    fn enabled_pages_filter_everything_but_dashboard() {
        let mut org = sample_organization("ganesh");
        org.enabled_pages = Some(vec!["expenses".into(), "gallery".into()]);

        let items = visible_sections(&org, Language::Telugu);
        let sections: Vec<Section> = items.iter().map(|i| i.section).collect();
        assert_eq!(
            sections,
            vec![Section::Dashboard, Section::Expenses, Section::Gallery]
        );
        assert_eq!(items[0].href, "/org/ganesh");
        assert_eq!(items[1].href, "/org/ganesh/expenses");
        assert_eq!(items[1].label, "ఖర్చులు");
    }
}
