//! Parsing for "<path>#<ids>" selectors and the id cursor built from them.

use crate::core::error::SaveError;

/// Separates the collection path from the id list
pub const ID_MARKER: char = '#';

/// One parsed path argument: collection path plus the ids it addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector
{
    /// Path part as typed (may be empty, e.g. "#3")
    pub path: String,
    /// Explicit ids as inclusive `(first, last)` spans, strictly increasing
    pub spans: Vec<(usize, usize)>,
    /// First id of the unbounded tail, if any
    pub open_start: Option<usize>,
    /// Whether the input carried a '#' at all
    pub has_marker: bool,
}

impl Selector
{
    /// Parse "saves#1,2,7,8-10,13,25-".
    ///
    /// No marker, an empty list, or `*` all select every id from 0 upward.
    /// Closed ranges stay as spans, so `#0-99999999999` costs nothing.
    ///
    /// # Errors
    ///
    /// Returns `SaveError::InvalidId` for malformed numbers, values that do
    /// not strictly increase, or anything after an open range.
    pub fn parse(input: &str) -> Result<Self, SaveError>
    {
        // Split from the right so '#' inside directory names survives
        let (path, spec, has_marker) = match input.rsplit_once(ID_MARKER)
        {
            Some((path, spec)) => (path, spec.trim(), true),
            None => (input, "", false),
        };

        if spec.is_empty() || spec == "*"
        {
            return Ok(Self {
                path: path.to_string(),
                spans: Vec::new(),
                open_start: Some(0),
                has_marker,
            });
        }

        let mut spans: Vec<(usize, usize)> = Vec::new();
        let mut open_start: Option<usize> = None;
        let mut last: Option<usize> = None;

        for seg in spec.split(',')
        {
            let seg = seg.trim();

            if open_start.is_some()
            {
                return Err(SaveError::invalid_id(input, format!("'{seg}' follows an open range")));
            }

            if let Some((a, b)) = seg.split_once('-')
            {
                // "-5" and "-" start at zero
                let start = if a.trim().is_empty() { 0 } else { parse_id(input, a)? };
                ensure_increasing(input, last, start)?;

                if b.trim().is_empty()
                {
                    open_start = Some(start);
                    continue;
                }

                let end = parse_id(input, b)?;
                if end < start
                {
                    return Err(SaveError::invalid_id(input, format!("start > end in range: {seg}")));
                }

                spans.push((start, end));
                last = Some(end);
            }
            else
            {
                let n = parse_id(input, seg)?;
                ensure_increasing(input, last, n)?;
                spans.push((n, n));
                last = Some(n);
            }
        }

        Ok(Self { path: path.to_string(), spans, open_start, has_marker })
    }

    /// Fresh cursor positioned at the first selected id
    pub fn generator(&self) -> IdGenerator
    {
        IdGenerator::new(self.spans.clone(), self.open_start)
    }
}

fn parse_id(
    input: &str,
    s: &str,
) -> Result<usize, SaveError>
{
    let s = s.trim();
    if s.is_empty()
    {
        return Err(SaveError::invalid_id(input, "empty id"));
    }
    s.parse::<usize>()
        .map_err(|_| SaveError::invalid_id(input, format!("not a save id: {s}")))
}

fn ensure_increasing(
    input: &str,
    last: Option<usize>,
    next: usize,
) -> Result<(), SaveError>
{
    match last
    {
        Some(prev) if next <= prev =>
        {
            Err(SaveError::invalid_id(input, format!("{next} does not follow {prev}")))
        }
        _ => Ok(()),
    }
}

/// Stateful cursor over explicit spans followed by an optional open tail.
///
/// Never collect this: an open tail makes it infinite. `nth` and `seek`
/// jump instead of stepping, so huge ids are cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator
{
    spans: Vec<(usize, usize)>,
    /// Index of the current span
    span: usize,
    /// Next id inside the current span
    at: usize,
    open_start: Option<usize>,
    cursor: Option<usize>,
}

impl IdGenerator
{
    pub fn new(
        spans: Vec<(usize, usize)>,
        open_start: Option<usize>,
    ) -> Self
    {
        let at = spans
            .first()
            .map_or(0, |s| s.0);
        Self { spans, span: 0, at, open_start, cursor: open_start }
    }

    /// Every id, starting at 0
    pub fn all() -> Self
    {
        Self::new(Vec::new(), Some(0))
    }

    /// Rewind to the first explicit id and the original tail start
    pub fn reset(&mut self)
    {
        self.span = 0;
        self.at = self
            .spans
            .first()
            .map_or(0, |s| s.0);
        self.cursor = self.open_start;
    }

    /// Next id that is `>= min`, consuming everything below it
    pub fn seek(
        &mut self,
        min: usize,
    ) -> Option<usize>
    {
        while let Some(&(_, last)) = self
            .spans
            .get(self.span)
        {
            if last < min
            {
                self.next_span();
                continue;
            }
            let id = self.at.max(min);
            self.consume(id, last);
            return Some(id);
        }

        self.take_tail(min, 0)
    }

    fn next_span(&mut self)
    {
        self.span += 1;
        if let Some(&(first, _)) = self
            .spans
            .get(self.span)
        {
            self.at = first;
        }
    }

    /// Mark `id` (inside the current span ending at `last`) as yielded
    fn consume(
        &mut self,
        id: usize,
        last: usize,
    )
    {
        if id >= last
        {
            self.next_span();
        }
        else
        {
            self.at = id + 1;
        }
    }

    /// Yield the tail id `skip` places after the cursor, at least `min`
    fn take_tail(
        &mut self,
        min: usize,
        skip: usize,
    ) -> Option<usize>
    {
        let Some(id) = self
            .cursor?
            .max(min)
            .checked_add(skip)
        else
        {
            self.cursor = None;
            return None;
        };
        self.cursor = id.checked_add(1);
        Some(id)
    }
}

impl Iterator for IdGenerator
{
    type Item = usize;

    fn next(&mut self) -> Option<usize>
    {
        self.nth(0)
    }

    fn nth(
        &mut self,
        mut n: usize,
    ) -> Option<usize>
    {
        while let Some(&(_, last)) = self
            .spans
            .get(self.span)
        {
            let left = last - self.at;
            if n <= left
            {
                let id = self.at + n;
                self.consume(id, last);
                return Some(id);
            }
            n -= left + 1;
            self.next_span();
        }

        self.take_tail(0, n)
    }
}

/// Decision for one stored id while filtering a sorted record stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict
{
    /// Selected
    Take,
    /// Not selected; later ids may still be
    Skip,
    /// Selection exhausted; nothing later can match
    Done,
}

/// Matches ascending stored ids against a generator without materializing it.
#[derive(Debug, Clone)]
pub struct IdFilter
{
    ids: IdGenerator,
    target: Option<usize>,
}

impl IdFilter
{
    pub fn new(mut ids: IdGenerator) -> Self
    {
        ids.reset();
        let target = ids.next();
        Self { ids, target }
    }

    /// Feed ids in ascending order
    pub fn check(
        &mut self,
        id: usize,
    ) -> Verdict
    {
        let Some(mut target) = self.target else { return Verdict::Done };

        if target < id
        {
            match self
                .ids
                .seek(id)
            {
                Some(n) => target = n,
                None =>
                {
                    self.target = None;
                    return Verdict::Done;
                }
            }
            self.target = Some(target);
        }

        if target == id
        {
            self.target = self
                .ids
                .next();
            Verdict::Take
        }
        else
        {
            Verdict::Skip
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse_mixed_list_with_open_tail()
    {
        let sel = Selector::parse("saves#1,2,7,8-10,13,25-").unwrap();
        assert_eq!(sel.path, "saves");
        assert_eq!(sel.spans, vec![(1, 1), (2, 2), (7, 7), (8, 10), (13, 13)]);
        assert_eq!(sel.open_start, Some(25));

        let got: Vec<usize> = sel
            .generator()
            .take(10)
            .collect();
        assert_eq!(got, vec![1, 2, 7, 8, 9, 10, 13, 25, 26, 27]);
    }

    #[test]
    fn test_no_marker_empty_and_star_select_everything()
    {
        for input in ["saves", "saves#", "saves#*"]
        {
            let sel = Selector::parse(input).unwrap();
            assert_eq!(sel.path, "saves");
            assert!(sel.spans.is_empty());
            assert_eq!(sel.open_start, Some(0));
        }
        assert!(!Selector::parse("saves").unwrap().has_marker);
        assert!(Selector::parse("saves#").unwrap().has_marker);
    }

    #[test]
    fn test_last_marker_wins()
    {
        let sel = Selector::parse("my#dir/x.rpgarch#4").unwrap();
        assert_eq!(sel.path, "my#dir/x.rpgarch");
        assert_eq!(sel.spans, vec![(4, 4)]);
        assert_eq!(sel.open_start, None);
    }

    #[test]
    fn test_rejects_bad_lists()
    {
        for input in ["#5,3", "#1-4,2", "#3-,5", "#3-,4-", "#x", "#1,,2", "#4-2", "#2,2"]
        {
            let err = Selector::parse(input).unwrap_err();
            assert!(matches!(err, SaveError::InvalidId { .. }), "{input}");
        }
    }

    #[test]
    fn test_generator_reset_rewinds_both_parts()
    {
        let mut g = Selector::parse("#3,5-")
            .unwrap()
            .generator();
        assert_eq!(g.next(), Some(3));
        assert_eq!(g.next(), Some(5));
        assert_eq!(g.next(), Some(6));
        g.reset();
        assert_eq!(g.next(), Some(3));
        assert_eq!(g.next(), Some(5));
    }

    #[test]
    fn test_closed_generator_exhausts()
    {
        let mut g = Selector::parse("#1-2")
            .unwrap()
            .generator();
        assert_eq!(g.next(), Some(1));
        assert_eq!(g.next(), Some(2));
        assert_eq!(g.next(), None);
        assert_eq!(g.next(), None);
    }

    #[test]
    fn test_seek_skips_into_tail()
    {
        let mut g = IdGenerator::new(vec![(1, 1), (4, 4)], Some(10));
        assert_eq!(g.seek(3), Some(4));
        assert_eq!(g.seek(12), Some(12));
        assert_eq!(g.next(), Some(13));
    }

    #[test]
    fn test_filter_over_sparse_ids()
    {
        let mut f = IdFilter::new(Selector::parse("#1,2,3,9").unwrap().generator());
        assert_eq!(f.check(0), Verdict::Skip);
        assert_eq!(f.check(3), Verdict::Take);
        assert_eq!(f.check(5), Verdict::Skip);
        assert_eq!(f.check(9), Verdict::Take);
        assert_eq!(f.check(10), Verdict::Done);
    }

    #[test]
    fn test_nth_jumps_across_spans_and_tail()
    {
        let mut g = Selector::parse("#2-4,9,20-")
            .unwrap()
            .generator();
        assert_eq!(g.nth(1), Some(3));
        assert_eq!(g.nth(1), Some(9));
        assert_eq!(g.nth(0), Some(20));
        assert_eq!(g.nth(1_000_000_000_000), Some(1_000_000_000_021));
        assert_eq!(g.next(), Some(1_000_000_000_022));
    }

    #[test]
    fn test_huge_closed_range_is_lazy()
    {
        let sel = Selector::parse("#0-99999999999").unwrap();
        assert_eq!(sel.spans, vec![(0, 99_999_999_999)]);

        let mut g = sel.generator();
        assert_eq!(g.seek(99_999_999_998), Some(99_999_999_998));
        assert_eq!(g.next(), Some(99_999_999_999));
        assert_eq!(g.next(), None);
    }

    #[test]
    fn test_tail_ends_at_usize_max()
    {
        let mut g = IdGenerator::new(Vec::new(), Some(usize::MAX - 1));
        assert_eq!(g.nth(1), Some(usize::MAX));
        assert_eq!(g.next(), None);

        let mut g = IdGenerator::new(Vec::new(), Some(usize::MAX));
        assert_eq!(g.nth(5), None);
    }
}
