use super::page::Page;
use crate::frame::FrameTracker;
use std::collections::VecDeque;

/// Rotating collection of pages; the front is always the current candidate.
#[derive(Debug, Default)]
pub struct PageRing {
    pages: VecDeque<Page>,
}

impl PageRing {
    pub fn new() -> Self {
        Self {
            pages: VecDeque::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    #[inline]
    pub fn front(&self) -> Option<&Page> {
        self.pages.front()
    }

    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut Page> {
        self.pages.front_mut()
    }

    pub fn push_front(&mut self, page: Page) -> &mut Page {
        self.pages.push_front(page);
        &mut self.pages[0]
    }

    /// Move the front page to the back, exposing the next one.
    #[inline]
    pub fn rotate_front(&mut self) {
        if let Some(page) = self.pages.pop_front() {
            self.pages.push_back(page);
        }
    }

    /// Visit every page at most once, rotating until `accept` holds for the
    /// front. On success the accepted page stays at the front.
    pub fn find_rotating(&mut self, mut accept: impl FnMut(&mut Page) -> bool) -> bool {
        for _ in 0..self.pages.len() {
            if let Some(front) = self.pages.front_mut() {
                if accept(front) {
                    return true;
                }
            }
            self.rotate_front();
        }
        false
    }

    /// Drop the first page the GPU has finished with, if any.
    pub fn evict_first_reclaimable(&mut self, frames: &FrameTracker) -> Option<Page> {
        if self.find_rotating(|page| page.is_reclaimable(frames)) {
            self.pages.pop_front()
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    /// Sum of page capacities.
    pub fn reserved_bytes(&self) -> usize {
        self.pages.iter().map(Page::capacity).sum()
    }
}
