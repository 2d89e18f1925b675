//! Sections of the bundled operations manual.
//!
//! Each function returns its own [`Section`]; the order of the manual is
//! decided by [`body`].

use crate::config::DocumentConfig;
use crate::content::ContentBuilder;
use crate::error::Result;
use crate::model::Section;
use crate::style::names;

const INCH_MM: f64 = 25.4;

/// Cover page with the product title and a table of service URLs.
pub fn cover(builder: &ContentBuilder<'_>, document: &DocumentConfig) -> Result<Section> {
    Ok(Section::untitled_builder()
        .identifier(Some("cover".to_string()))
        .break_after(true)
        .push(builder.spacer(1.5 * INCH_MM))
        .push(builder.text(names::COVER_TITLE, &document.title)?)
        .push(builder.text(names::COVER_SUBTITLE, &document.subtitle)?)
        .push(builder.spacer(0.5 * INCH_MM))
        .push(builder.text(names::COVER_VERSION, format!("Version {}", document.version))?)
        .push(builder.spacer(0.5 * INCH_MM))
        .push(builder.table(
            [
                ["Resource", "URL"],
                ["Web Application", "https://app.example.com"],
                ["Backend API", "https://api.example.com"],
                ["Investor Page", "https://app.example.com/investors"],
                ["Demo Login", "demo@example.com / demo-password"],
            ],
            vec![2.0 * INCH_MM, 4.0 * INCH_MM],
        )?)
        .build())
}

/// Every numbered chapter, in manual order.
pub fn body(builder: &ContentBuilder<'_>) -> Result<Vec<Section>> {
    Ok(vec![
        executive_summary(builder)?,
        dashboard(builder)?,
        staff(builder)?,
        queue(builder)?,
        booths(builder)?,
        revenue(builder)?,
        settings(builder)?,
        investors(builder)?,
        tech_stack(builder)?,
        subscriptions(builder)?,
    ])
}

fn chapter(builder: &ContentBuilder<'_>, title: &str, intro: &str) -> Result<crate::model::SectionBuilder> {
    let identifier = title
        .split_once(". ")
        .map(|(number, _)| format!("chapter-{number}"));
    Ok(Section::builder(title)
        .identifier(identifier)
        .break_after(true)
        .push(builder.text(names::SECTION_TITLE, title)?)
        .push(builder.text(names::BODY, intro)?))
}

fn executive_summary(builder: &ContentBuilder<'_>) -> Result<Section> {
    Ok(chapter(
        builder,
        "1. Executive Summary",
        "The platform is a hosted operations suite for hospitality venues. It brings staff \
         scheduling, entertainment queues, booth reservations and revenue tracking into one \
         dark-themed interface designed for low-light environments, with every module \
         updating in real time.",
    )?
    .push(builder.text(names::SUB_SECTION, "Design Principles")?)
    .extend(builder.bullets([
        "Dark theme with gold, blue and red accents",
        "Optimized for low-light working environments",
        "Real-time synchronization across all modules",
        "Drag-and-drop interfaces for quick operation",
        "Responsive layout for management on the go",
    ])?)
    .push(builder.spacer(0.3 * INCH_MM))
    .push(builder.text(names::SUB_SECTION, "Brand Color Palette")?)
    .push(builder.table(
        [
            ["Color", "Hex Code", "Usage"],
            ["Gold (Primary)", "#F59E0B", "Buttons, highlights, branding"],
            ["Electric Blue", "#3B82F6", "Links, interactive elements"],
            ["Danger Red", "#DC2626", "Alerts, occupied status"],
            ["Success Green", "#22C55E", "Confirmations, available status"],
            ["Dark Background", "#0F172A", "Primary background color"],
        ],
        vec![1.5 * INCH_MM, 1.2 * INCH_MM, 3.0 * INCH_MM],
    )?)
    .build())
}

fn dashboard(builder: &ContentBuilder<'_>) -> Result<Section> {
    Ok(chapter(
        builder,
        "2. Dashboard Overview",
        "The main dashboard gives at-a-glance visibility into venue operations with live \
         metrics, an activity feed and quick action buttons.",
    )?
    .extend(builder.screenshot(
        "01-dashboard.png",
        Some("Figure 2.1: Main dashboard with live metrics and activity feed"),
    )?)
    .push(builder.text(names::SUB_SECTION, "Key Dashboard Components")?)
    .extend(builder.bullets([
        "Active Staff Counter: checked-in staff against the full roster",
        "Booth Status: live occupancy with a percentage indicator",
        "Queue Status: current queue depth",
        "Today's Revenue: running total with growth percentage",
        "Recent Activity: license alerts, payments and check-ins",
        "Monthly Revenue: progress toward the monthly goal",
        "Quick Actions: one-click access to common tasks",
    ])?)
    .build())
}

fn staff(builder: &ContentBuilder<'_>) -> Result<Section> {
    Ok(chapter(
        builder,
        "3. Staff Management",
        "Roster management with license compliance tracking, fee collection and status \
         monitoring. Color-coded cards make compliance issues visible immediately.",
    )?
    .extend(builder.screenshot(
        "02-staff.png",
        Some("Figure 3.1: Staff roster with compliance status indicators"),
    )?)
    .push(builder.text(names::SUB_SECTION, "License Status Indicators")?)
    .push(builder.table(
        [
            ["Status", "Indicator", "Meaning"],
            ["Valid", "Green", "License current for more than 30 days"],
            ["Expiring", "Yellow", "License expires within 30 days"],
            ["Expired", "Red", "Check-in blocked until renewed"],
        ],
        vec![1.3 * INCH_MM, 1.2 * INCH_MM, 3.5 * INCH_MM],
    )?)
    .push(builder.text(names::SUB_SECTION, "Checking In a Staff Member")?)
    .extend(builder.numbered([
        "Open the Staff page from the sidebar",
        "Select the staff member's card",
        "Confirm the license status is not expired",
        "Collect the shift fee and press Check In",
    ])?)
    .build())
}

fn queue(builder: &ContentBuilder<'_>) -> Result<Section> {
    Ok(chapter(
        builder,
        "4. Entertainment Queue",
        "The queue orders performances for the evening and drives the integrated music \
         player. Entries are reordered by dragging them within the list.",
    )?
    .extend(builder.screenshot(
        "03-queue.png",
        Some("Figure 4.1: Queue interface with integrated music player"),
    )?)
    .push(builder.text(names::SUB_SECTION, "Music Player Features")?)
    .extend(builder.bullets([
        "Automatic audio normalization on upload",
        "Per-performer playlist management",
        "Volume control with visual feedback",
        "Track progress timeline with seek",
        "Previous, play and next controls",
    ])?)
    .build())
}

fn booths(builder: &ContentBuilder<'_>) -> Result<Section> {
    Ok(chapter(
        builder,
        "5. Booth Management",
        "Live booth monitoring with session timers, occupancy tracking and revenue \
         calculation. Status cards show availability at a glance.",
    )?
    .extend(builder.screenshot(
        "04-booths.png",
        Some("Figure 5.1: Booth status cards with session controls"),
    )?)
    .push(builder.text(names::SUB_SECTION, "Booth Status Types")?)
    .push(builder.table(
        [
            ["Status", "Color", "Actions Available"],
            ["Available", "Green", "Start Session, Set Maintenance"],
            ["Occupied", "Red", "End Session, View Details"],
            ["Cleaning", "Yellow", "Mark Available"],
            ["Maintenance", "Gray", "Mark Available"],
        ],
        vec![1.5 * INCH_MM, 1.0 * INCH_MM, 3.5 * INCH_MM],
    )?)
    .build())
}

fn revenue(builder: &ContentBuilder<'_>) -> Result<Section> {
    Ok(chapter(
        builder,
        "6. Revenue Dashboard",
        "Revenue is broken down by category with progress toward daily and monthly goals.",
    )?
    .extend(builder.screenshot(
        "05-revenue.png",
        Some("Figure 6.1: Revenue dashboard with breakdown and goal progress"),
    )?)
    .push(builder.text(names::SUB_SECTION, "Revenue Categories")?)
    .push(builder.table(
        [
            ["Category", "Source", "Reported"],
            ["Shift Fees", "Staff check-in", "Per shift"],
            ["Booth Sessions", "Booth timers", "Per session"],
            ["Admissions", "Door register", "Hourly"],
            ["Other", "Manual entry", "Daily"],
        ],
        Vec::new(),
    )?)
    .build())
}

fn settings(builder: &ContentBuilder<'_>) -> Result<Section> {
    Ok(chapter(
        builder,
        "7. Settings & Configuration",
        "Venue-wide settings are grouped by category. Changes apply immediately to every \
         connected device.",
    )?
    .extend(builder.screenshot(
        "06-settings.png",
        Some("Figure 7.1: Settings page with profile configuration"),
    )?)
    .push(builder.text(names::SUB_SECTION, "Settings Categories")?)
    .extend(builder.bullets([
        "Venue Profile: name, address, opening hours",
        "Fees: shift fees, booth rates and grace periods",
        "Notifications: license expiry and payment alerts",
        "Users: manager accounts and role permissions",
    ])?)
    .push(builder.text(names::SUB_SUB_SECTION, "Environment file")?)
    .push(builder.text(
        names::CODE_BLOCK,
        "API_URL=https://api.example.com\nREALTIME=enabled\nTIMEZONE=America/New_York",
    )?)
    .build())
}

fn investors(builder: &ContentBuilder<'_>) -> Result<Section> {
    Ok(chapter(
        builder,
        "8. Investor Landing Page",
        "A public landing page presents the product, traction and pricing to prospective \
         investors.",
    )?
    .extend(builder.screenshot(
        "07-investors.png",
        Some("Figure 8.1: Investor landing page hero section"),
    )?)
    .push(builder.text(names::SUB_SECTION, "Key Investor Highlights")?)
    .extend(builder.bullets([
        "Recurring subscription revenue across four tiers",
        "Purpose-built workflows for a specialized market",
        "Multi-location support for venue groups",
    ])?)
    .build())
}

fn tech_stack(builder: &ContentBuilder<'_>) -> Result<Section> {
    Ok(chapter(
        builder,
        "9. Technical Stack",
        "The platform is split into a single-page web client and a stateless API service.",
    )?
    .push(builder.text(names::SUB_SECTION, "Frontend")?)
    .extend(builder.bullets([
        "React 18 with TypeScript",
        "Vite for fast builds",
        "Tailwind CSS",
        "Lucide React icons",
    ])?)
    .push(builder.text(names::SUB_SECTION, "Backend")?)
    .extend(builder.bullets([
        "Node.js with Express",
        "PostgreSQL with Prisma ORM",
        "JWT authentication",
        "Socket.io for real-time updates",
    ])?)
    .build())
}

fn subscriptions(builder: &ContentBuilder<'_>) -> Result<Section> {
    Ok(chapter(
        builder,
        "10. Subscription Tiers",
        "Every tier includes hosting, updates and email support.",
    )?
    .break_after(false)
    .push(builder.table(
        [
            ["Tier", "Price", "Features"],
            ["Free", "$0/mo", "Basic dashboard, up to 10 staff"],
            ["Basic", "$99/mo", "Full dashboard, unlimited staff"],
            ["Pro", "$199/mo", "All features, API access, analytics"],
            ["Enterprise", "$399/mo", "Multi-location, white-label, SLA"],
        ],
        vec![1.2 * INCH_MM, 1.0 * INCH_MM, 4.0 * INCH_MM],
    )?)
    .build())
}
