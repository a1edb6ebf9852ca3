use super::extract::EndPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Indication,
    LastTouch,
    Monthly,
    Scroll,
}

impl TableKind {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Indication => "INDICATION",
            Self::LastTouch => "LASTTOUCH",
            Self::Monthly => "MONTHLY",
            Self::Scroll => "SCROLL",
        }
    }

    pub fn sheet_name(self) -> &'static str {
        match self {
            Self::Indication => "BMS Adobe Indication Website",
            Self::LastTouch => "BMS Adobe Last Touch Website",
            Self::Monthly => "BMS Adobe Monthly Website",
            Self::Scroll => "BMS Adobe Scroll Website",
        }
    }

    pub fn schema(self) -> &'static TableSchema {
        match self {
            Self::Indication => &INDICATION_SCHEMA,
            Self::LastTouch => &LAST_TOUCH_SCHEMA,
            Self::Monthly => &MONTHLY_SCHEMA,
            Self::Scroll => &SCROLL_SCHEMA,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    LastSentinel,
    LabeledBlock(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitRule {
    MetricFirst,
    DateStamped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    Mean,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    GroupThenKey,
    KeyThenGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionOrder {
    KeyFirst,
    GroupFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WideLayout {
    pub group_column: &'static str,
    pub strip_upper_spaces: bool,
    pub split: SplitRule,
    pub duplicates: DuplicatePolicy,
    pub dimensions: DimensionOrder,
    pub sort: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Wide(WideLayout),
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricColumn {
    pub source: &'static str,
    pub output: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enrichment {
    Brand,
    Indication,
    ActivityStartMonth,
    ActivityEndMonth,
}

impl Enrichment {
    pub fn column(self) -> &'static str {
        match self {
            Self::Brand => "BRAND",
            Self::Indication => "INDICATION",
            Self::ActivityStartMonth => "ACTIVITY START MONTH",
            Self::ActivityEndMonth => "ACTIVITY END MONTH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub kind: TableKind,
    pub locator: Locator,
    pub end: EndPolicy,
    pub key_column: &'static str,
    pub layout: Layout,
    pub metrics: &'static [MetricColumn],
    pub enrichment: &'static [Enrichment],
}

impl TableSchema {
    pub fn output_columns(&self) -> Vec<&'static str> {
        let mut columns = self.shaped_columns();
        columns.extend(self.enrichment.iter().map(|extra| extra.column()));
        columns
    }

    pub fn shaped_columns(&self) -> Vec<&'static str> {
        let mut columns = match self.layout {
            Layout::Wide(wide) => match wide.dimensions {
                DimensionOrder::KeyFirst => vec![self.key_column, wide.group_column],
                DimensionOrder::GroupFirst => vec![wide.group_column, self.key_column],
            },
            Layout::Flat => vec![self.key_column],
        };
        columns.extend(self.metrics.iter().map(|metric| metric.output));
        columns
    }
}

const fn metric(source: &'static str, output: &'static str) -> MetricColumn {
    MetricColumn { source, output }
}

static INDICATION_SCHEMA: TableSchema = TableSchema {
    kind: TableKind::Indication,
    locator: Locator::LastSentinel,
    end: EndPolicy::EndOfSheet,
    key_column: "INDICATION",
    layout: Layout::Wide(WideLayout {
        group_column: "CHANNEL",
        strip_upper_spaces: true,
        split: SplitRule::MetricFirst,
        duplicates: DuplicatePolicy::Mean,
        dimensions: DimensionOrder::KeyFirst,
        sort: SortOrder::GroupThenKey,
    }),
    metrics: &[
        metric("Visits", "VISITS"),
        metric("Unbouncedvisit", "UNBOUNCED VISIT"),
    ],
    enrichment: &[
        Enrichment::Brand,
        Enrichment::ActivityStartMonth,
        Enrichment::ActivityEndMonth,
    ],
};

static LAST_TOUCH_SCHEMA: TableSchema = TableSchema {
    kind: TableKind::LastTouch,
    locator: Locator::LastSentinel,
    end: EndPolicy::EndOfSheet,
    key_column: "LAST TOUCH CHANNEL",
    layout: Layout::Wide(WideLayout {
        group_column: "ACTIVITY MONTH",
        strip_upper_spaces: false,
        split: SplitRule::DateStamped,
        duplicates: DuplicatePolicy::Reject,
        dimensions: DimensionOrder::GroupFirst,
        sort: SortOrder::KeyThenGroup,
    }),
    metrics: &[
        metric("Unique", "UNIQUE VISITORS"),
        metric("Visits", "VISITS"),
        metric("Unbounced", "UNBOUNCED VISIT"),
        metric("Bounce", "BOUNCE RATE"),
        metric("Page", "PAGE VIEWS PER VISITS"),
        metric("Average", "AVERAGE TIME ON SITE"),
    ],
    enrichment: &[Enrichment::Brand, Enrichment::Indication],
};

static MONTHLY_SCHEMA: TableSchema = TableSchema {
    kind: TableKind::Monthly,
    locator: Locator::LabeledBlock(super::markers::MONTHLY_TABLE_LABEL),
    end: EndPolicy::BlankRow,
    key_column: "ACTIVITY MONTH",
    layout: Layout::Flat,
    metrics: &[
        metric("Unique Visitors", "UNIQUE VISITORS"),
        metric("Visits", "VISITS"),
        metric("Unbounced visit", "UNBOUNCED VISIT"),
        metric("Bounce Rate", "BOUNCE RATE"),
        metric("Page Views / Visits", "PAGE VIEWS PER VISITS"),
        metric("Average Time on Site", "AVERAGE TIME ON SITE"),
    ],
    enrichment: &[Enrichment::Brand, Enrichment::Indication],
};

static SCROLL_SCHEMA: TableSchema = TableSchema {
    kind: TableKind::Scroll,
    locator: Locator::LastSentinel,
    end: EndPolicy::EndOfSheet,
    key_column: "PAGE",
    layout: Layout::Wide(WideLayout {
        group_column: "ACTIVITY MONTH",
        strip_upper_spaces: true,
        split: SplitRule::DateStamped,
        duplicates: DuplicatePolicy::Reject,
        dimensions: DimensionOrder::KeyFirst,
        sort: SortOrder::KeyThenGroup,
    }),
    metrics: &[
        metric("PageViews", "PAGE VIEWS"),
        metric("PageScroll25%", "PAGE SCROLL 25"),
        metric("PageScroll50%", "PAGE SCROLL 50"),
        metric("PageScroll75%", "PAGE SCROLL 75"),
        metric("PageScroll100%", "PAGE SCROLL 100"),
    ],
    enrichment: &[Enrichment::Brand, Enrichment::Indication],
};
