// -*- mode: rust; -*-
//
// This file is part of groupexp.
// See LICENSE for licensing information.

//! Background execution of lazy evaluations.

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        /// Run `task` on the global rayon pool.
        pub(crate) fn spawn<F>(task: F)
        where
            F: FnOnce() + Send + 'static,
        {
            rayon::spawn(task);
        }
    } else {
        /// Run `task` on a detached thread.
        pub(crate) fn spawn<F>(task: F)
        where
            F: FnOnce() + Send + 'static,
        {
            std::thread::spawn(task);
        }
    }
}
