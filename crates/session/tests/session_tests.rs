use std::sync::Arc;

use hireloop_session::{
    guard, FileStorage, Guarded, Role, Route, Session, SessionStorage, SessionUser, StorageKey,
};
use tempfile::TempDir;

#[test]
fn protected_page_without_token_redirects_before_rendering() {
    let dir = TempDir::new().expect("tempdir");
    let storage = FileStorage::open(dir.path().join("tokens.json")).expect("open storage");

    let mut renders = 0;
    let outcome = guard(Route::Subscription, &storage, || {
        renders += 1;
    });

    assert_eq!(outcome, Guarded::Redirected(Route::SignIn));
    assert_eq!(renders, 0);
}

#[test]
fn file_backed_session_survives_restart() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("tokens.json");

    {
        let storage: Arc<dyn SessionStorage> =
            Arc::new(FileStorage::open(&path).expect("open storage"));
        let session = Session::new(storage);
        session
            .sign_in(
                SessionUser::new("r-9", "Grace", "grace@example.com", Role::Recruiter),
                "recruiter-token",
            )
            .expect("sign in");
    }

    let storage: Arc<dyn SessionStorage> =
        Arc::new(FileStorage::open(&path).expect("reopen storage"));
    let session = Session::restore(storage.clone());
    let context = session.context();

    assert_eq!(context.user_id().as_deref(), Some("r-9"));
    assert_eq!(context.bearer_token().as_deref(), Some("recruiter-token"));
    assert!(matches!(
        guard(Route::RecruiterJobs, storage.as_ref(), || ()),
        Guarded::Rendered(())
    ));

    session.sign_out().expect("sign out");
    let storage = FileStorage::open(&path).expect("reopen after sign out");
    assert!(storage.get(StorageKey::AccessToken).is_none());
    assert!(storage.get(StorageKey::Identity).is_none());
}
