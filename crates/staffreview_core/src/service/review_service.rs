//! Review use-case service.
//!
//! # Responsibility
//! - Provide the save/create/find/update/delete lifecycle for reviews.
//! - Run the employee reference-integrity check before every flush.
//! - Track persisted snapshots in a session-scoped `IdentityMap`.
//!
//! # Invariants
//! - Every review inserted, updated or loaded through a service is
//!   registered in that service's identity map.
//! - A failed insert never assigns an id.
//! - A failed flush leaves in-memory fields as the caller set them;
//!   `is_dirty` reports the divergence and `revert` restores the snapshot.

use crate::model::review::{EmployeeId, ReviewId, ReviewRecord, ReviewValidationError};
use crate::repo::employee_repo::EmployeeDirectory;
use crate::repo::review_repo::{RepoError, RepoResult, ReviewRepository};
use crate::service::identity_map::IdentityMap;
use log::{info, warn};

/// Use-case service for review persistence.
///
/// One instance corresponds to one session; drop it to discard the
/// identity map.
pub struct ReviewService<R: ReviewRepository, E: EmployeeDirectory> {
    repo: R,
    employees: E,
    identity: IdentityMap,
}

impl<R: ReviewRepository, E: EmployeeDirectory> ReviewService<R, E> {
    pub fn new(repo: R, employees: E) -> Self {
        Self {
            repo,
            employees,
            identity: IdentityMap::new(),
        }
    }

    /// Verifies that `employee_id` resolves to an existing employee.
    ///
    /// # Errors
    /// - `RepoError::Validation(UnknownEmployee)` when no such employee exists.
    pub fn check_employee(&self, employee_id: EmployeeId) -> RepoResult<()> {
        if self.employees.employee_exists(employee_id)? {
            return Ok(());
        }
        warn!(
            "event=review_reference_check module=service status=error employee_id={employee_id}"
        );
        Err(ReviewValidationError::UnknownEmployee(employee_id).into())
    }

    /// Checks the employee reference, then assigns it to `review`.
    ///
    /// The review is left unchanged when the check fails.
    pub fn assign_employee(
        &self,
        review: &mut ReviewRecord,
        employee_id: EmployeeId,
    ) -> RepoResult<()> {
        self.check_employee(employee_id)?;
        review.set_employee_id(employee_id);
        Ok(())
    }

    /// Builds a review, checks its employee reference and persists it.
    pub fn create(
        &mut self,
        year: i64,
        summary: impl Into<String>,
        employee_id: EmployeeId,
    ) -> RepoResult<ReviewRecord> {
        let mut review = ReviewRecord::new(year, summary, employee_id)?;
        self.save(&mut review)?;
        Ok(review)
    }

    /// Inserts a transient review or updates a persisted one.
    ///
    /// # Contract
    /// - Transient: inserts, assigns the store id and registers the snapshot.
    /// - Persisted: rewrites the row and refreshes the snapshot.
    pub fn save(&mut self, review: &mut ReviewRecord) -> RepoResult<()> {
        match review.id() {
            None => self.insert(review),
            Some(_) => self.update(review),
        }
    }

    /// Rewrites all columns of a persisted review.
    ///
    /// # Errors
    /// - `RepoError::Transient` when the review has no id.
    /// - `RepoError::NotFound` when the row no longer exists.
    pub fn update(&mut self, review: &ReviewRecord) -> RepoResult<()> {
        let id = review.id().ok_or(RepoError::Transient)?;
        self.check_employee(review.employee_id())?;

        if let Err(err) = self.repo.update_review(review) {
            warn!(
                "event=review_save module=service status=error mode=update review_id={id} error={err}"
            );
            return Err(err);
        }

        self.identity.register(review);
        info!("event=review_save module=service status=ok mode=update review_id={id}");
        Ok(())
    }

    /// Deletes the row behind `review`, evicts it and makes it transient.
    ///
    /// A row that was already gone is not an error; the review is still
    /// evicted and reset.
    pub fn delete(&mut self, review: &mut ReviewRecord) -> RepoResult<()> {
        let id = review.id().ok_or(RepoError::Transient)?;
        let removed = self.repo.delete_review(id)?;

        self.identity.evict(id);
        review.clear_id();
        info!("event=review_delete module=service status=ok review_id={id} removed={removed}");
        Ok(())
    }

    /// Loads one review by primary key and registers it.
    pub fn find_by_id(&mut self, id: ReviewId) -> RepoResult<Option<ReviewRecord>> {
        match self.repo.get_review(id)? {
            Some(review) => {
                self.identity.register(&review);
                Ok(Some(review))
            }
            None => {
                self.identity.evict(id);
                Ok(None)
            }
        }
    }

    /// Loads every review in storage order and registers each one.
    pub fn get_all(&mut self) -> RepoResult<Vec<ReviewRecord>> {
        let reviews = self.repo.list_reviews()?;
        self.register_all(&reviews);
        Ok(reviews)
    }

    /// Loads all reviews of one employee, ordered by id.
    pub fn list_for_employee(&mut self, employee_id: EmployeeId) -> RepoResult<Vec<ReviewRecord>> {
        let reviews = self.repo.list_reviews_for_employee(employee_id)?;
        self.register_all(&reviews);
        Ok(reviews)
    }

    /// Returns whether `review` differs from its last persisted snapshot.
    ///
    /// Transient reviews and reviews unknown to this session are dirty.
    pub fn is_dirty(&self, review: &ReviewRecord) -> bool {
        match review.id().and_then(|id| self.identity.get(id)) {
            Some(snapshot) => snapshot != review,
            None => true,
        }
    }

    /// Restores `review` to its last persisted snapshot.
    ///
    /// Returns `false` and leaves the review untouched when no snapshot exists.
    pub fn revert(&self, review: &mut ReviewRecord) -> bool {
        match review.id().and_then(|id| self.identity.get(id)) {
            Some(snapshot) => {
                *review = snapshot.clone();
                true
            }
            None => false,
        }
    }

    pub fn identity_map(&self) -> &IdentityMap {
        &self.identity
    }

    fn insert(&mut self, review: &mut ReviewRecord) -> RepoResult<()> {
        self.check_employee(review.employee_id())?;

        let id = match self.repo.insert_review(review) {
            Ok(id) => id,
            Err(err) => {
                warn!("event=review_save module=service status=error mode=insert error={err}");
                return Err(err);
            }
        };

        review.assign_id(id);
        self.identity.register(review);
        info!(
            "event=review_save module=service status=ok mode=insert review_id={id} employee_id={}",
            review.employee_id()
        );
        Ok(())
    }

    fn register_all(&mut self, reviews: &[ReviewRecord]) {
        for review in reviews {
            self.identity.register(review);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ReviewService;
    use crate::model::review::{EmployeeId, ReviewId, ReviewRecord, ReviewValidationError};
    use crate::repo::employee_repo::EmployeeDirectory;
    use crate::repo::review_repo::{RepoError, RepoResult, ReviewRepository};
    use std::cell::{Cell, RefCell};
    use std::collections::{BTreeMap, BTreeSet};

    struct FakeEmployees(BTreeSet<EmployeeId>);

    impl EmployeeDirectory for FakeEmployees {
        fn employee_exists(&self, id: EmployeeId) -> RepoResult<bool> {
            Ok(self.0.contains(&id))
        }
    }

    #[derive(Default)]
    struct FakeReviews {
        rows: RefCell<BTreeMap<ReviewId, ReviewRecord>>,
        next_id: Cell<ReviewId>,
        fail_writes: Cell<bool>,
    }

    impl FakeReviews {
        fn write_guard(&self) -> RepoResult<()> {
            if self.fail_writes.get() {
                return Err(RepoError::InvalidData("write rejected".to_string()));
            }
            Ok(())
        }
    }

    impl ReviewRepository for &FakeReviews {
        fn insert_review(&self, review: &ReviewRecord) -> RepoResult<ReviewId> {
            self.write_guard()?;
            let id = self.next_id.get() + 1;
            self.next_id.set(id);
            let stored =
                ReviewRecord::with_id(id, review.year(), review.summary(), review.employee_id())?;
            self.rows.borrow_mut().insert(id, stored);
            Ok(id)
        }

        fn update_review(&self, review: &ReviewRecord) -> RepoResult<()> {
            self.write_guard()?;
            let id = review.id().ok_or(RepoError::Transient)?;
            match self.rows.borrow_mut().get_mut(&id) {
                Some(row) => {
                    *row = review.clone();
                    Ok(())
                }
                None => Err(RepoError::NotFound(id)),
            }
        }

        fn get_review(&self, id: ReviewId) -> RepoResult<Option<ReviewRecord>> {
            Ok(self.rows.borrow().get(&id).cloned())
        }

        fn list_reviews(&self) -> RepoResult<Vec<ReviewRecord>> {
            Ok(self.rows.borrow().values().cloned().collect())
        }

        fn list_reviews_for_employee(
            &self,
            employee_id: EmployeeId,
        ) -> RepoResult<Vec<ReviewRecord>> {
            Ok(self
                .rows
                .borrow()
                .values()
                .filter(|review| review.employee_id() == employee_id)
                .cloned()
                .collect())
        }

        fn delete_review(&self, id: ReviewId) -> RepoResult<bool> {
            Ok(self.rows.borrow_mut().remove(&id).is_some())
        }
    }

    fn employees() -> FakeEmployees {
        FakeEmployees([1, 2].into_iter().collect())
    }

    #[test]
    fn save_rejects_unknown_employee_without_touching_store() {
        let store = FakeReviews::default();
        let mut service = ReviewService::new(&store, employees());

        let mut review = ReviewRecord::new(2022, "orphan", 99).unwrap();
        let err = service.save(&mut review).unwrap_err();

        assert!(matches!(
            err,
            RepoError::Validation(ReviewValidationError::UnknownEmployee(99))
        ));
        assert_eq!(review.id(), None);
        assert!(store.rows.borrow().is_empty());
        assert!(service.identity_map().is_empty());
    }

    #[test]
    fn assign_employee_leaves_review_unchanged_on_failure() {
        let store = FakeReviews::default();
        let service = ReviewService::new(&store, employees());
        let mut review = ReviewRecord::new(2022, "move", 1).unwrap();

        assert!(service.assign_employee(&mut review, 42).is_err());
        assert_eq!(review.employee_id(), 1);

        service.assign_employee(&mut review, 2).unwrap();
        assert_eq!(review.employee_id(), 2);
    }

    #[test]
    fn failed_insert_keeps_review_transient() {
        let store = FakeReviews::default();
        store.fail_writes.set(true);
        let mut service = ReviewService::new(&store, employees());

        let mut review = ReviewRecord::new(2022, "never stored", 1).unwrap();
        assert!(service.save(&mut review).is_err());
        assert_eq!(review.id(), None);
        assert!(service.identity_map().is_empty());
    }

    #[test]
    fn failed_update_is_reported_dirty_and_can_be_reverted() {
        let store = FakeReviews::default();
        let mut service = ReviewService::new(&store, employees());
        let mut review = service.create(2021, "baseline", 1).unwrap();
        assert!(!service.is_dirty(&review));

        review.set_summary("edited offline").unwrap();
        store.fail_writes.set(true);
        assert!(service.save(&mut review).is_err());

        assert_eq!(review.summary(), "edited offline");
        assert!(service.is_dirty(&review));

        assert!(service.revert(&mut review));
        assert_eq!(review.summary(), "baseline");
        assert!(!service.is_dirty(&review));
    }

    #[test]
    fn update_and_delete_require_an_id() {
        let store = FakeReviews::default();
        let mut service = ReviewService::new(&store, employees());
        let mut review = ReviewRecord::new(2021, "transient", 1).unwrap();

        assert!(matches!(service.update(&review), Err(RepoError::Transient)));
        assert!(matches!(
            service.delete(&mut review),
            Err(RepoError::Transient)
        ));
        assert!(!service.revert(&mut review));
    }

    #[test]
    fn loads_register_snapshots() {
        let store = FakeReviews::default();
        let mut writer = ReviewService::new(&store, employees());
        let first = writer.create(2020, "a", 1).unwrap();
        writer.create(2021, "b", 2).unwrap();

        let mut reader = ReviewService::new(&store, employees());
        assert!(reader.identity_map().is_empty());

        reader.find_by_id(first.id().unwrap()).unwrap();
        assert_eq!(reader.identity_map().len(), 1);

        reader.get_all().unwrap();
        assert_eq!(reader.identity_map().len(), 2);
    }

    #[test]
    fn find_by_id_evicts_vanished_rows() {
        let store = FakeReviews::default();
        let mut service = ReviewService::new(&store, employees());
        let review = service.create(2020, "gone soon", 1).unwrap();
        let id = review.id().unwrap();

        store.rows.borrow_mut().remove(&id);
        assert!(service.find_by_id(id).unwrap().is_none());
        assert!(!service.identity_map().contains(id));
    }
}
