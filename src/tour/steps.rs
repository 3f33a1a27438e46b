use super::TourSection;

/// Where the tooltip sits relative to its anchor.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Placement {
    Center,
    Top,
    Bottom,
    Left,
    Right,
}

/// What a step points at.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Target {
    /// The whole page. Always present.
    WholePage,
    /// A selector that must resolve to an element on screen.
    Selector(&'static str),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Step {
    pub target: Target,
    pub content: &'static str,
    pub placement: Placement,
    /// Opening step of a section; hosts hide the beacon for it.
    pub is_first: bool,
}

const fn step(target: &'static str, content: &'static str, placement: Placement) -> Step {
    Step {
        target: Target::Selector(target),
        content,
        placement,
        is_first: false,
    }
}

const fn first(target: Target, content: &'static str, placement: Placement) -> Step {
    Step {
        target,
        content,
        placement,
        is_first: true,
    }
}

const fn whole_page(content: &'static str) -> Step {
    Step {
        target: Target::WholePage,
        content,
        placement: Placement::Center,
        is_first: false,
    }
}

static DASHBOARD: [Step; 6] = [
    first(
        Target::WholePage,
        "Welcome to your admin panel! Let's take a quick tour of everything it can do.",
        Placement::Center,
    ),
    step(
        r#"[data-tutorial="nav-menu"]"#,
        "This is the main navigation menu. Every section of the panel is one click away.",
        Placement::Bottom,
    ),
    step(
        r#"[data-tutorial="dashboard-link"]"#,
        "The dashboard gives you an overview of your metrics and statistics.",
        Placement::Bottom,
    ),
    step(
        r#"[data-tutorial="dashboard-stats"]"#,
        "Your key numbers live here: page views, leads, conversion rate and active listings.",
        Placement::Bottom,
    ),
    step(
        r#"[data-tutorial="dashboard-charts"]"#,
        "These charts show interactions per hour and how your listings split by type.",
        Placement::Top,
    ),
    step(
        r#"[data-tutorial="profile-menu"]"#,
        "Your account options are here.",
        Placement::Left,
    ),
];

static PROPERTIES: [Step; 13] = [
    first(
        Target::Selector(r#"[data-tutorial="properties-header"]"#),
        "Welcome to the listing manager! Add, edit, delete and organize your whole catalog here.",
        Placement::Bottom,
    ),
    step(
        r#"[data-tutorial="properties-add"]"#,
        "Use this button to add a new listing. It opens the full listing form.",
        Placement::Left,
    ),
    step(
        r#"[data-tutorial="properties-view-mode"]"#,
        "Switch between the detailed list view and the photo-focused grid view.",
        Placement::Bottom,
    ),
    step(
        r#"[data-tutorial="properties-search"]"#,
        "Search by title, city, neighborhood or any other listing detail.",
        Placement::Bottom,
    ),
    step(
        r#"[data-tutorial="properties-status-filter"]"#,
        "Filter listings by deal type: for sale, for rent, or both.",
        Placement::Bottom,
    ),
    step(
        r#"[data-tutorial="properties-type-filter"]"#,
        "Filter by property type: house, apartment, land or commercial.",
        Placement::Bottom,
    ),
    step(
        r#"[data-tutorial="properties-total"]"#,
        "The number of listings matching the current filters, and how many are selected.",
        Placement::Bottom,
    ),
    step(
        r#"[data-tutorial="properties-bulk-actions"]"#,
        "With listings selected you can delete or feature them all at once.",
        Placement::Bottom,
    ),
    step(
        r#"[data-tutorial="properties-table-header"]"#,
        "Click a column header to sort by title, price, creation date and more.",
        Placement::Bottom,
    ),
    step(
        r#"[data-tutorial="properties-checkbox"]"#,
        "Tick listings to select them. The header checkbox selects the whole page.",
        Placement::Right,
    ),
    step(
        r#"[data-tutorial="properties-featured"]"#,
        "The star marks featured listings. They are shown first on the public site.",
        Placement::Left,
    ),
    step(
        r#"[data-tutorial="properties-actions"]"#,
        "Edit, delete or preview each listing from here.",
        Placement::Left,
    ),
    whole_page(
        "That's the listing manager. Use these tools to keep your catalog current and tidy.",
    ),
];

static SETTINGS: [Step; 9] = [
    first(
        Target::Selector(r#"[data-tutorial="settings-header"]"#),
        "Welcome to settings! Customize the panel and manage your preferences here.",
        Placement::Bottom,
    ),
    step(
        r#"[data-tutorial="settings-profile"]"#,
        "Update your name, e-mail, phone number and profile photo.",
        Placement::Bottom,
    ),
    step(
        r#"[data-tutorial="settings-security"]"#,
        "Change your password and set up two-step verification.",
        Placement::Bottom,
    ),
    step(
        r#"[data-tutorial="settings-notifications"]"#,
        "Choose which alerts about leads, visits and interactions you receive.",
        Placement::Bottom,
    ),
    step(
        r#"[data-tutorial="settings-appearance"]"#,
        "Pick the theme, accent colors and layout of the panel.",
        Placement::Bottom,
    ),
    step(
        r#"[data-tutorial="settings-integrations"]"#,
        "Connect analytics, messaging and social network accounts.",
        Placement::Bottom,
    ),
    step(
        r#"[data-tutorial="settings-export"]"#,
        "Configure data exports: file format and included fields.",
        Placement::Bottom,
    ),
    step(
        r#"[data-tutorial="settings-tutorial"]"#,
        "Restart this tutorial from here whenever you need a refresher.",
        Placement::Bottom,
    ),
    whole_page(
        "You have finished the admin tour. Everything you need to manage your catalog is at hand.",
    ),
];

/// The full, unfiltered walkthrough of one section.
pub fn steps_for(section: TourSection) -> &'static [Step] {
    match section {
        TourSection::Dashboard => &DASHBOARD,
        TourSection::Properties => &PROPERTIES,
        TourSection::Settings => &SETTINGS,
    }
}
