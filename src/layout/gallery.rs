/// Visual size class of a gallery tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileVariant {
    Default,
    Wide,
    Tall,
    ExtraLarge,
}

/// Grid cells a tile occupies on the widest (four column) breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridSpan {
    pub cols: u8,
    pub rows: u8,
}

impl GridSpan {
    const fn new(cols: u8, rows: u8) -> Self {
        Self { cols, rows }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileLayout {
    pub variant: TileVariant,
    pub span: GridSpan,
}

impl TileLayout {
    const fn new(variant: TileVariant, cols: u8, rows: u8) -> Self {
        Self {
            variant,
            span: GridSpan::new(cols, rows),
        }
    }

    /// Grid placement classes for the large breakpoint.
    pub fn span_class(&self) -> String {
        format!(
            "lg:col-span-{} lg:row-span-{}",
            self.span.cols, self.span.rows
        )
    }

    /// Anything bigger than a single cell gets the large card treatment.
    pub fn is_large(&self) -> bool {
        self.variant != TileVariant::Default
    }
}

/// Length of the repeating tile rhythm for result sets of four or more.
pub const PATTERN_LEN: usize = 8;

const PATTERN: [TileLayout; PATTERN_LEN] = [
    TileLayout::new(TileVariant::ExtraLarge, 2, 2),
    TileLayout::new(TileVariant::Default, 1, 1),
    TileLayout::new(TileVariant::Default, 1, 1),
    TileLayout::new(TileVariant::Wide, 2, 1),
    TileLayout::new(TileVariant::Tall, 1, 2),
    TileLayout::new(TileVariant::Default, 1, 1),
    TileLayout::new(TileVariant::Default, 1, 1),
    TileLayout::new(TileVariant::Wide, 2, 1),
];

/// Assigns a tile layout from an item's position and the result count.
///
/// Pure and deterministic. Small result sets get hand-picked layouts so the
/// grid stays filled; from four items on, the fixed eight-slot pattern
/// repeats by position alone.
pub fn layout_for(index: usize, total: usize) -> TileLayout {
    match total {
        1 => TileLayout::new(TileVariant::ExtraLarge, 4, 2),
        2 => TileLayout::new(TileVariant::ExtraLarge, 2, 2),
        3 if index == 0 => TileLayout::new(TileVariant::ExtraLarge, 2, 2),
        3 => TileLayout::new(TileVariant::Wide, 2, 1),
        _ => PATTERN[index % PATTERN_LEN],
    }
}

/// An item paired with its layout.
#[derive(Debug, Clone, Copy)]
pub struct GalleryTile<'a, T> {
    pub index: usize,
    pub item: &'a T,
    pub layout: TileLayout,
}

/// Lays out a whole result sequence in order.
pub fn arrange<T>(items: &[T]) -> Vec<GalleryTile<'_, T>> {
    let total = items.len();
    items
        .iter()
        .enumerate()
        .map(|(index, item)| GalleryTile {
            index,
            item,
            layout: layout_for(index, total),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_item_fills_the_row() {
        let layout = layout_for(0, 1);
        assert_eq!(layout.variant, TileVariant::ExtraLarge);
        assert_eq!(layout.span, GridSpan { cols: 4, rows: 2 });
        assert_eq!(layout.span_class(), "lg:col-span-4 lg:row-span-2");
        assert!(layout.is_large());
    }

    #[test]
    fn test_two_items_are_both_large() {
        for index in 0..2 {
            let layout = layout_for(index, 2);
            assert_eq!(layout.variant, TileVariant::ExtraLarge);
            assert_eq!(layout.span, GridSpan { cols: 2, rows: 2 });
        }
    }

    #[test]
    fn test_three_items_lead_with_large() {
        assert_eq!(layout_for(0, 3), TileLayout::new(TileVariant::ExtraLarge, 2, 2));
        assert_eq!(layout_for(1, 3), TileLayout::new(TileVariant::Wide, 2, 1));
        assert_eq!(layout_for(2, 3), TileLayout::new(TileVariant::Wide, 2, 1));
        assert_ne!(layout_for(0, 3), layout_for(1, 3));
    }

    #[test]
    fn test_pattern_slots() {
        let expected = [
            (TileVariant::ExtraLarge, 2, 2),
            (TileVariant::Default, 1, 1),
            (TileVariant::Default, 1, 1),
            (TileVariant::Wide, 2, 1),
            (TileVariant::Tall, 1, 2),
            (TileVariant::Default, 1, 1),
            (TileVariant::Default, 1, 1),
            (TileVariant::Wide, 2, 1),
        ];
        for (index, (variant, cols, rows)) in expected.into_iter().enumerate() {
            let layout = layout_for(index, 20);
            assert_eq!(layout.variant, variant, "slot {index}");
            assert_eq!(layout.span, GridSpan { cols, rows }, "slot {index}");
        }
        assert!(!layout_for(1, 20).is_large());
        assert_eq!(layout_for(4, 20).span_class(), "lg:col-span-1 lg:row-span-2");
    }

    #[test]
    fn test_pattern_repeats_every_eight() {
        for index in 0..PATTERN_LEN {
            assert_eq!(layout_for(index + 8, 10), layout_for(index, 10));
            assert_eq!(layout_for(index + 16, 40), layout_for(index, 40));
        }
        assert_eq!(layout_for(8, 10), layout_for(0, 10));
    }

    #[test]
    fn test_layout_is_stable_across_runs() {
        let items: Vec<u32> = (0..13).collect();
        let first: Vec<TileLayout> = arrange(&items).iter().map(|t| t.layout).collect();
        let second: Vec<TileLayout> = arrange(&items).iter().map(|t| t.layout).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), items.len());
    }

    #[test]
    fn test_arrange_empty() {
        let items: Vec<u32> = Vec::new();
        assert!(arrange(&items).is_empty());
    }
}
