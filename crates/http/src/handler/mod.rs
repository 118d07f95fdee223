//! Plugin request filters.
//!
//! A filter gets mutable access to one decoded [`Request`] and records its
//! changes there. Filters never encode anything themselves; once every filter
//! of the phase has run, the accumulated changes are encoded in one go.

use std::sync::Arc;

use crate::protocol::Request;

pub trait RequestFilter {
    fn request_filter(&self, req: &mut Request<'_>);
}

#[derive(Debug)]
pub struct FilterFn<F> {
    f: F,
}

impl<F> RequestFilter for FilterFn<F>
where
    F: Fn(&mut Request<'_>),
{
    fn request_filter(&self, req: &mut Request<'_>) {
        (self.f)(req);
    }
}

pub fn make_filter<F>(f: F) -> FilterFn<F>
where
    F: Fn(&mut Request<'_>),
{
    FilterFn { f }
}

impl<T: RequestFilter + ?Sized> RequestFilter for &T {
    fn request_filter(&self, req: &mut Request<'_>) {
        (**self).request_filter(req);
    }
}

impl<T: RequestFilter + ?Sized> RequestFilter for Box<T> {
    fn request_filter(&self, req: &mut Request<'_>) {
        (**self).request_filter(req);
    }
}

impl<T: RequestFilter + ?Sized> RequestFilter for Arc<T> {
    fn request_filter(&self, req: &mut Request<'_>) {
        (**self).request_filter(req);
    }
}

/// Runs every filter in order on the same request.
impl<T: RequestFilter> RequestFilter for [T] {
    fn request_filter(&self, req: &mut Request<'_>) {
        for filter in self {
            filter.request_filter(req);
        }
    }
}

impl<T: RequestFilter> RequestFilter for Vec<T> {
    fn request_filter(&self, req: &mut Request<'_>) {
        self.as_slice().request_filter(req);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::ReqBuilder;

    #[test]
    fn closure_filter() {
        let filter = make_filter(|req: &mut Request<'_>| req.set_path("/rewritten"));

        let buf = ReqBuilder::new(1, "/").build();
        let mut request = Request::decode(&buf).unwrap();
        filter.request_filter(&mut request);

        assert_eq!(request.path(), b"/rewritten");
    }

    #[test]
    fn filters_run_in_order() {
        let filters: Vec<Box<dyn RequestFilter>> = vec![
            Box::new(make_filter(|req: &mut Request<'_>| {
                req.header().set("X-Step", "1").unwrap();
            })),
            Box::new(make_filter(|req: &mut Request<'_>| {
                let step = req.header().get("x-step").cloned();
                assert_eq!(step.unwrap(), "1");
                req.header().set("X-Step", "2").unwrap();
            })),
        ];

        let buf = ReqBuilder::new(1, "/").build();
        let mut request = Request::decode(&buf).unwrap();
        filters.request_filter(&mut request);

        assert_eq!(request.header().get("x-step").unwrap(), "2");
    }

    #[test]
    fn noop_filter_leaves_request_untouched() {
        let filter = Arc::new(make_filter(|req: &mut Request<'_>| {
            let _ = req.method();
        }));

        let buf = ReqBuilder::new(1, "/").header("A", "1").build();
        let mut request = Request::decode(&buf).unwrap();
        filter.request_filter(&mut request);

        assert!(!request.is_touched());
    }
}
