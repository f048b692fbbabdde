use test_log::test;
use timetree::{Error, PersistentVec};

#[test]
fn vec_branching_appends() -> timetree::Result<()> {
    let (mut vec, v0) = PersistentVec::new();

    let v1 = vec.push(v0, "a")?;
    let v2 = vec.push(v1, "b")?;
    let v3 = vec.push(v1, "c")?;
    let v4 = vec.push(v2, "c")?;
    let v5 = vec.push(v3, "b")?;
    assert_eq!((1, 2, 3, 4, 5), (v1, v2, v3, v4, v5));

    assert_eq!(vec!["a"], vec.to_vec(v1)?);
    assert_eq!(vec!["a", "b"], vec.to_vec(v2)?);
    assert_eq!(vec!["a", "c"], vec.to_vec(v3)?);
    assert_eq!(vec!["a", "b", "c"], vec.to_vec(v4)?);
    assert_eq!(vec!["a", "c", "b"], vec.to_vec(v5)?);

    Ok(())
}

#[test]
fn vec_window_then_append_and_set() -> timetree::Result<()> {
    // Same setup as the branching test...
    let (mut vec, v0) = PersistentVec::new();
    let v1 = vec.push(v0, "a")?;
    let v2 = vec.push(v1, "b")?;
    let _v3 = vec.push(v1, "c")?;
    let v4 = vec.push(v2, "c")?;

    // ...then narrow v4 = [a, b, c] down to its middle
    let v6 = vec.slice(v4, 1..2)?;
    assert_eq!(vec!["b"], vec.to_vec(v6)?);
    assert_eq!(1, vec.len(v6)?);

    // Appends from the window reuse physical cells populated by other
    // branches before growing the array
    let v7 = vec.push(v6, "d")?;
    assert_eq!(vec!["b", "d"], vec.to_vec(v7)?);

    let v8 = vec.push(v7, "e")?;
    assert_eq!(vec!["b", "d", "e"], vec.to_vec(v8)?);

    let v9 = vec.set(v8, 2, "f")?;
    assert_eq!(vec!["b", "d", "f"], vec.to_vec(v9)?);

    // The windowed-over branch still reads as before
    assert_eq!(vec!["a", "b", "c"], vec.to_vec(v4)?);

    Ok(())
}

#[test]
fn vec_invalid_handles_and_ranges() -> timetree::Result<()> {
    let (mut vec, v0) = PersistentVec::new();
    let v1 = vec.push(v0, "a")?;

    assert_eq!(Err(Error::IndexOutOfRange), vec.get(v1, 1));
    assert_eq!(Err(Error::IndexOutOfRange), vec.get(v0, 0));
    assert_eq!(Err(Error::IndexOutOfRange), vec.set(v0, 0, "x"));
    assert_eq!(Err(Error::IndexOutOfRange), vec.slice(v1, 2..1));
    assert_eq!(Err(Error::IndexOutOfRange), vec.slice(v1, 0..2));
    assert_eq!(Err(Error::VersionNotFound(9)), vec.push(9, "x"));

    Ok(())
}

#[test]
fn vec_nested_windows() -> timetree::Result<()> {
    let (mut vec, v0) = PersistentVec::new();

    let mut version = v0;
    for value in 0..6 {
        version = vec.push(version, value)?;
    }
    assert_eq!(vec![0, 1, 2, 3, 4, 5], vec.to_vec(version)?);

    let outer = vec.slice(version, 1..5)?;
    assert_eq!(vec![1, 2, 3, 4], vec.to_vec(outer)?);

    // A window of a window composes the offsets
    let inner = vec.slice(outer, 1..3)?;
    assert_eq!(vec![2, 3], vec.to_vec(inner)?);
    assert_eq!(2, *vec.get(inner, 0)?);

    // Writing through the inner window leaves the outer one alone
    let written = vec.set(inner, 0, 20)?;
    assert_eq!(vec![20, 3], vec.to_vec(written)?);
    assert_eq!(vec![1, 2, 3, 4], vec.to_vec(outer)?);

    Ok(())
}
