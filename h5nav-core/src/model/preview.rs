//!
//! ``src/model/preview.rs``
//!
//! Preview of the selected entry, computed on demand from the index and the
//! collection's sample slot.

use compact_str::CompactString;
use tokio_util::sync::CancellationToken;

use crate::{
    fs::container::{Sample, Scalar},
    model::{
        entry::{EntryKind, EntryPath, Shape},
        entry_index::{ChildListing, EntryIndex},
    },
};

/// Progress of the one outstanding sample request of a collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SampleState {
    #[default]
    Idle,
    Loading,
    Ready(Sample),
    Failed(String),
}

/// Latest sample request. Completions carrying an older revision are dropped.
#[derive(Debug, Clone, Default)]
pub struct SampleSlot {
    pub revision: u64,
    pub path: Option<EntryPath>,
    pub state: SampleState,
    token: Option<CancellationToken>,
}

impl SampleSlot {
    /// Start a new request for `path`, cancelling the outstanding one.
    /// Returns the new revision.
    pub fn issue(&mut self, path: EntryPath, token: CancellationToken) -> u64 {
        if let Some(previous) = self.token.replace(token) {
            previous.cancel();
        }

        self.revision += 1;
        self.path = Some(path);
        self.state = SampleState::Loading;
        self.revision
    }

    /// Drop the outstanding request, if any.
    pub fn clear(&mut self) {
        if let Some(previous) = self.token.take() {
            previous.cancel();
        }

        self.revision += 1;
        self.path = None;
        self.state = SampleState::Idle;
    }

    /// Store a completion if it is still the latest request.
    pub fn complete(&mut self, revision: u64, path: &EntryPath, state: SampleState) -> bool {
        if revision != self.revision || self.path.as_ref() != Some(path) {
            return false;
        }

        self.state = state;
        true
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state == SampleState::Loading
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SampleView {
    Loading,
    Ready { values: Vec<Scalar>, truncated: bool },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    /// Nothing selected.
    Empty,

    NotFound(EntryPath),

    Group {
        path: EntryPath,
        children: Vec<(CompactString, EntryKind)>,
        /// Children past the display limit.
        more: usize,
    },

    GroupLoading(EntryPath),

    GroupUnavailable { path: EntryPath, reason: String },

    Dataset {
        path: EntryPath,
        shape: Option<Shape>,
        dtype: Option<CompactString>,
        sample: SampleView,
    },
}

impl Preview {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            Self::GroupLoading(_)
                | Self::Dataset {
                    sample: SampleView::Loading,
                    ..
                }
        )
    }
}

/// Pure: same inputs, same preview. A sample is shown only if the slot was
/// issued for `selected`; anything else renders as loading.
#[must_use]
pub fn render_preview(
    selected: Option<&EntryPath>,
    index: &EntryIndex,
    slot: &SampleSlot,
    max_children: usize,
) -> Preview {
    let Some(path) = selected else {
        return Preview::Empty;
    };

    let Ok(entry) = index.get(path) else {
        return Preview::NotFound(path.clone());
    };

    match entry.kind {
        EntryKind::Group => match index.list_children(path) {
            Ok(ChildListing::Loaded(children)) => {
                let more = children.len().saturating_sub(max_children);
                let children = children
                    .into_iter()
                    .take(max_children)
                    .map(|child| (CompactString::new(child.name()), child.kind))
                    .collect();

                Preview::Group {
                    path: path.clone(),
                    children,
                    more,
                }
            }
            Ok(ChildListing::Unavailable(reason)) => Preview::GroupUnavailable {
                path: path.clone(),
                reason: reason.to_string(),
            },
            Ok(ChildListing::NeedsLoad | ChildListing::Loading) => Preview::GroupLoading(path.clone()),
            Err(_) => Preview::NotFound(path.clone()),
        },

        EntryKind::Dataset => {
            let current = slot.path.as_ref() == Some(path);
            let (sample, sampled) = match &slot.state {
                SampleState::Ready(sample) if current => (
                    SampleView::Ready {
                        values: sample.values.clone(),
                        truncated: sample.truncated,
                    },
                    Some(sample),
                ),
                SampleState::Failed(reason) if current => (SampleView::Failed(reason.clone()), None),
                _ => (SampleView::Loading, None),
            };

            Preview::Dataset {
                path: path.clone(),
                shape: entry
                    .shape
                    .clone()
                    .or_else(|| sampled.map(|s| s.shape.clone())),
                dtype: entry
                    .dtype
                    .clone()
                    .or_else(|| sampled.map(|s| s.dtype.clone())),
                sample,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::*;
    use crate::fs::container::ChildRecord;

    fn index_with(children: Vec<ChildRecord>) -> EntryIndex {
        let mut index = EntryIndex::new();
        index.begin_load(&EntryPath::root()).unwrap();
        index.apply_children(&EntryPath::root(), children).unwrap();
        index
    }

    fn sample(values: Vec<Scalar>) -> Sample {
        Sample {
            shape: smallvec![values.len()],
            dtype: CompactString::new("i64"),
            values,
            truncated: false,
        }
    }

    #[test]
    fn test_group_preview_truncates() {
        let records = (0..5).map(|i| ChildRecord::group(format!("g{i}"))).collect();
        let index = index_with(records);
        let preview = render_preview(Some(&EntryPath::root()), &index, &SampleSlot::default(), 3);

        let Preview::Group { children, more, .. } = preview else {
            panic!("expected group preview");
        };
        assert_eq!(children.len(), 3);
        assert_eq!(children[0], (CompactString::new("g0"), EntryKind::Group));
        assert_eq!(more, 2);
    }

    #[test]
    fn test_unloaded_group_is_loading() {
        let index = index_with(vec![ChildRecord::group("a")]);
        let preview = render_preview(Some(&EntryPath::new("/a")), &index, &SampleSlot::default(), 10);
        assert_eq!(preview, Preview::GroupLoading(EntryPath::new("/a")));
        assert!(preview.is_loading());
    }

    #[test]
    fn test_stale_sample_never_shown() {
        let index = index_with(vec![
            ChildRecord::dataset("x", None, None),
            ChildRecord::dataset("y", None, None),
        ]);
        let x = EntryPath::new("/x");
        let y = EntryPath::new("/y");

        let mut slot = SampleSlot::default();
        let rev_x = slot.issue(x.clone(), CancellationToken::new());
        assert!(slot.complete(rev_x, &x, SampleState::Ready(sample(vec![Scalar::Int(1)]))));

        // Selection moved to y while a sample for y is pending.
        let token_y = CancellationToken::new();
        let rev_y = slot.issue(y.clone(), token_y.clone());
        let preview = render_preview(Some(&y), &index, &slot, 10);
        assert!(matches!(preview, Preview::Dataset { sample: SampleView::Loading, .. }));

        // Late completion for x is rejected.
        assert!(!slot.complete(rev_x, &x, SampleState::Ready(sample(vec![Scalar::Int(9)]))));
        assert!(slot.complete(rev_y, &y, SampleState::Ready(sample(vec![Scalar::Int(2), Scalar::Int(3)]))));
        assert!(!token_y.is_cancelled());

        let Preview::Dataset { shape, dtype, sample, .. } = render_preview(Some(&y), &index, &slot, 10) else {
            panic!("expected dataset preview");
        };
        assert_eq!(shape.as_deref(), Some(&[2][..]));
        assert_eq!(dtype.as_deref(), Some("i64"));
        assert_eq!(
            sample,
            SampleView::Ready {
                values: vec![Scalar::Int(2), Scalar::Int(3)],
                truncated: false
            }
        );
    }

    #[test]
    fn test_missing_and_empty() {
        let index = EntryIndex::new();
        assert_eq!(render_preview(None, &index, &SampleSlot::default(), 10), Preview::Empty);
        assert_eq!(
            render_preview(Some(&EntryPath::new("/gone")), &index, &SampleSlot::default(), 10),
            Preview::NotFound(EntryPath::new("/gone"))
        );
    }
}
